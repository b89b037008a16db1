//! ADPCM decoder implementation
//!
//! Replays the encoder's reconstruction exactly, starting from the state
//! stored in the block header.

use crate::{ADPCM_HEADER_SIZE, AdpcmError, AdpcmState};

/// Decode an ADPCM stream back to PCM
///
/// # Arguments
/// * `data` - Header + nibble stream as produced by [`crate::encode_adpcm`]
/// * `total_samples` - Number of samples to decode (the stream does not store it)
///
/// # Errors
/// Returns `AdpcmError` if the header is missing or invalid, or the stream
/// holds fewer than `total_samples` nibbles
pub fn decode_adpcm(data: &[u8], total_samples: usize) -> Result<Vec<i16>, AdpcmError> {
    let mut state = AdpcmState::from_header(data)?;
    let nibbles = &data[ADPCM_HEADER_SIZE..];

    if nibbles.len() < total_samples.div_ceil(2) {
        return Err(AdpcmError::TruncatedData);
    }

    let mut output = Vec::with_capacity(total_samples);
    for i in 0..total_samples {
        let byte = nibbles[i / 2];
        let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
        output.push(state.apply(nibble));
    }

    Ok(output)
}
