//! Error type shared by the container writers and the WAV parser.

/// Errors raised while parsing inputs or building 3DS containers
#[derive(Debug, thiserror::Error)]
pub enum CtrError {
    /// Malformed input or a violated layout invariant
    #[error("invalid format: {0}")]
    Format(String),

    /// Well-formed input that this encoder does not handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Operation attempted without the state it depends on
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("ADPCM decoding failed: {0}")]
    Adpcm(#[from] ctr_adpcm::AdpcmError),

    #[error("LZ11 decompression failed: {0}")]
    Lz11(#[from] ctr_lz11::Lz11Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtrError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        CtrError::Format(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        CtrError::UnsupportedFormat(message.into())
    }
}

/// Result alias used throughout `ctr-common`
pub type Result<T> = std::result::Result<T, CtrError>;
