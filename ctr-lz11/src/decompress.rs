//! LZ11 decompressor
//!
//! [`TokenReader`] walks the token stream without materialising output, which
//! is what the inspection tooling and the token tests need. [`decompress`] is
//! built on top of it.

use crate::{LZ11_HEADER_SIZE, LZ11_MAGIC, Lz11Error};

/// A single decoded LZ11 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// One byte copied verbatim
    Literal(u8),
    /// Copy `length` bytes starting `displacement` bytes back
    Reference { displacement: usize, length: usize },
}

impl Token {
    /// Number of output bytes this token produces
    pub fn output_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Reference { length, .. } => *length,
        }
    }
}

/// Read the uncompressed size from an LZ11 header
///
/// # Errors
/// `InvalidMagic` if the tag byte is not 0x11, `TruncatedData` if the
/// header is incomplete
pub fn uncompressed_size(data: &[u8]) -> Result<usize, Lz11Error> {
    read_header(data).map(|(size, _)| size)
}

/// Returns `(uncompressed size, offset of the first indicator byte)`
fn read_header(data: &[u8]) -> Result<(usize, usize), Lz11Error> {
    if data.len() < LZ11_HEADER_SIZE {
        return Err(Lz11Error::TruncatedData);
    }
    if data[0] != LZ11_MAGIC {
        return Err(Lz11Error::InvalidMagic(data[0]));
    }

    let size = u32::from_le_bytes([data[1], data[2], data[3], 0]) as usize;
    if size == 0 && data.len() >= LZ11_HEADER_SIZE + 4 {
        let extended = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
        return Ok((extended, LZ11_HEADER_SIZE + 4));
    }

    Ok((size, LZ11_HEADER_SIZE))
}

/// Iterator over the tokens of an LZ11 stream
///
/// Stops once the tokens cover the declared uncompressed size; unused
/// indicator bits in the final block are ignored.
pub struct TokenReader<'a> {
    data: &'a [u8],
    pos: usize,
    remaining: usize,
    indicator: u8,
    slot: u8,
    failed: bool,
}

impl<'a> TokenReader<'a> {
    /// Start reading after the stream header
    pub fn new(data: &'a [u8]) -> Result<Self, Lz11Error> {
        let (size, pos) = read_header(data)?;
        Ok(Self {
            data,
            pos,
            remaining: size,
            indicator: 0,
            slot: 8,
            failed: false,
        })
    }

    /// Declared size still to be produced
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn byte(&mut self) -> Result<u8, Lz11Error> {
        let byte = *self.data.get(self.pos).ok_or(Lz11Error::TruncatedData)?;
        self.pos += 1;
        Ok(byte)
    }

    fn next_token(&mut self) -> Result<Token, Lz11Error> {
        if self.slot == 8 {
            self.indicator = self.byte()?;
            self.slot = 0;
        }
        let is_reference = self.indicator & (0x80 >> self.slot) != 0;
        self.slot += 1;

        if !is_reference {
            return Ok(Token::Literal(self.byte()?));
        }

        let b0 = self.byte()? as usize;
        let (length, disp_hi) = match b0 >> 4 {
            0 => {
                let b1 = self.byte()? as usize;
                ((((b0 & 0x0F) << 4) | (b1 >> 4)) + 0x11, b1 & 0x0F)
            }
            1 => {
                let b1 = self.byte()? as usize;
                let b2 = self.byte()? as usize;
                ((((b0 & 0x0F) << 12) | (b1 << 4) | (b2 >> 4)) + 0x111, b2 & 0x0F)
            }
            n => (n + 1, b0 & 0x0F),
        };
        let disp_lo = self.byte()? as usize;

        Ok(Token::Reference {
            displacement: ((disp_hi << 8) | disp_lo) + 1,
            length,
        })
    }
}

impl Iterator for TokenReader<'_> {
    type Item = Result<Token, Lz11Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }

        match self.next_token() {
            Ok(token) => {
                self.remaining = self.remaining.saturating_sub(token.output_len());
                Some(Ok(token))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Collect every token of an LZ11 stream
pub fn tokens(data: &[u8]) -> Result<Vec<Token>, Lz11Error> {
    TokenReader::new(data)?.collect()
}

/// Decompress an LZ11 stream
///
/// # Errors
/// Returns `Lz11Error` for a bad header, a truncated stream, or a
/// back-reference that points before the start of the output
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Lz11Error> {
    let reader = TokenReader::new(data)?;
    let size = reader.remaining();
    let mut output = Vec::with_capacity(size);

    for token in reader {
        match token? {
            Token::Literal(byte) => output.push(byte),
            Token::Reference {
                displacement,
                length,
            } => {
                if displacement > output.len() {
                    return Err(Lz11Error::InvalidDisplacement {
                        displacement,
                        position: output.len(),
                    });
                }
                // Byte-by-byte so overlapping copies repeat the run
                for _ in 0..length.min(size - output.len()) {
                    output.push(output[output.len() - displacement]);
                }
            }
        }
    }

    Ok(output)
}
