//! Minimal RIFF/WAVE reader
//!
//! Accepts uncompressed PCM only. Chunks may appear in any order; unknown
//! chunks are skipped, including the pad byte that follows odd-sized chunks.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{CtrError, Result};

/// WAVE format tag for uncompressed integer PCM
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Size of the PCM `fmt ` body; anything past it is an extension
const FMT_BODY_SIZE: u32 = 16;

/// Audio parameters from the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

/// Parse a WAV stream, returning its format and the raw `data` payload
///
/// # Errors
/// - `Format`: bad RIFF/WAVE magic, missing `fmt `/`data`, truncated data
/// - `UnsupportedFormat`: format tag other than PCM
pub fn parse_wav<R: Read + Seek>(mut reader: R) -> Result<(WavFormat, Vec<u8>)> {
    let mut riff = [0u8; 12];
    reader
        .read_exact(&mut riff)
        .map_err(|_| CtrError::format("file too small for a RIFF header"))?;
    if &riff[0..4] != b"RIFF" {
        return Err(CtrError::format("missing RIFF magic"));
    }
    if &riff[8..12] != b"WAVE" {
        return Err(CtrError::format("missing WAVE magic"));
    }

    let mut format = None;
    let mut data = None;

    while format.is_none() || data.is_none() {
        let Some((id, size)) = read_chunk_header(&mut reader)? else {
            break;
        };

        match &id {
            b"fmt " => format = Some(read_fmt(&mut reader, size)?),
            b"data" => data = Some(read_data(&mut reader, size)?),
            _ => skip(&mut reader, size as u64)?,
        }
        if size % 2 == 1 {
            skip(&mut reader, 1)?;
        }
    }

    match (format, data) {
        (Some(format), Some(data)) => Ok((format, data)),
        (None, _) => Err(CtrError::format("missing fmt chunk")),
        (_, None) => Err(CtrError::format("missing data chunk")),
    }
}

/// Returns `None` at end of stream
fn read_chunk_header<R: Read>(reader: &mut R) -> Result<Option<([u8; 4], u32)>> {
    let mut header = [0u8; 8];
    match reader.read_exact(&mut header) {
        Ok(()) => {
            let id = [header[0], header[1], header[2], header[3]];
            let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
            Ok(Some((id, size)))
        }
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_fmt<R: Read + Seek>(reader: &mut R, size: u32) -> Result<WavFormat> {
    if size < FMT_BODY_SIZE {
        return Err(CtrError::format(format!("fmt chunk too small ({} bytes)", size)));
    }

    let mut body = [0u8; FMT_BODY_SIZE as usize];
    reader
        .read_exact(&mut body)
        .map_err(|_| CtrError::format("truncated fmt chunk"))?;

    let tag = u16::from_le_bytes([body[0], body[1]]);
    if tag != WAVE_FORMAT_PCM {
        return Err(CtrError::unsupported(format!(
            "WAV format tag {} (only PCM is supported)",
            tag
        )));
    }

    let channels = u16::from_le_bytes([body[2], body[3]]);
    if channels == 0 {
        return Err(CtrError::format("WAV declares zero channels"));
    }

    skip(reader, (size - FMT_BODY_SIZE) as u64)?;

    Ok(WavFormat {
        channels,
        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
        // bytes 8..14 are byte rate and block align, derived values
        bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
    })
}

fn read_data<R: Read>(reader: &mut R, size: u32) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(size as u64).read_to_end(&mut data)?;
    if data.len() != size as usize {
        return Err(CtrError::format(format!(
            "truncated data chunk ({} of {} bytes)",
            data.len(),
            size
        )));
    }
    Ok(data)
}

fn skip<R: Seek>(reader: &mut R, bytes: u64) -> Result<()> {
    if bytes > 0 {
        reader.seek(SeekFrom::Current(bytes as i64))?;
    }
    Ok(())
}

/// Decode little-endian 16-bit PCM bytes
pub fn pcm16_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Average interleaved channels down to mono
///
/// The average truncates toward zero. A trailing partial frame is dropped.
pub fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Parse a 16-bit PCM WAV and return its format and mono samples
///
/// # Errors
/// As [`parse_wav`], plus `UnsupportedFormat` for bit depths other than 16
pub fn read_mono_pcm16<R: Read + Seek>(reader: R) -> Result<(WavFormat, Vec<i16>)> {
    let (format, data) = parse_wav(reader)?;
    if format.bits_per_sample != 16 {
        return Err(CtrError::unsupported(format!(
            "{}-bit WAV (only 16-bit PCM is supported)",
            format.bits_per_sample
        )));
    }
    let samples = downmix_to_mono(&pcm16_samples(&data), format.channels);
    Ok((format, samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn hound_wav(channels: u16, bits: u16, samples: &[i32]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn fmt_body(tag: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let align = channels * bits / 8;
        let mut body = Vec::new();
        body.extend_from_slice(&tag.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&rate.to_le_bytes());
        body.extend_from_slice(&(rate * align as u32).to_le_bytes());
        body.extend_from_slice(&align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_parse_hound_output() {
        let bytes = hound_wav(1, 16, &[1, -2, 300, -400]);
        let (format, data) = parse_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(
            format,
            WavFormat {
                sample_rate: 22050,
                bits_per_sample: 16,
                channels: 1
            }
        );
        assert_eq!(pcm16_samples(&data), vec![1, -2, 300, -400]);
    }

    #[test]
    fn test_data_before_fmt() {
        let bytes = riff(&[
            chunk(b"data", &[0x10, 0x00, 0x20, 0x00]),
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
        ]);
        let (format, data) = parse_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(format.sample_rate, 8000);
        assert_eq!(data, vec![0x10, 0x00, 0x20, 0x00]);
    }

    #[test]
    fn test_skips_unknown_odd_chunk() {
        let bytes = riff(&[
            chunk(b"LIST", b"abc"),
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
            chunk(b"data", &[1, 0]),
        ]);
        let (_, data) = parse_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(data, vec![1, 0]);
    }

    #[test]
    fn test_skips_fmt_extension() {
        let mut fmt = fmt_body(1, 2, 44100, 16);
        fmt.extend_from_slice(&[0, 0]); // cbSize
        let bytes = riff(&[chunk(b"fmt ", &fmt), chunk(b"data", &[5, 0, 7, 0])]);
        let (format, data) = parse_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(format.channels, 2);
        assert_eq!(data, vec![5, 0, 7, 0]);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = hound_wav(1, 16, &[0]);
        bytes[0] = b'X';
        assert!(matches!(parse_wav(Cursor::new(bytes)), Err(CtrError::Format(_))));

        let mut bytes = hound_wav(1, 16, &[0]);
        bytes[8] = b'X';
        assert!(matches!(parse_wav(Cursor::new(bytes)), Err(CtrError::Format(_))));

        assert!(matches!(parse_wav(Cursor::new(b"RIFF".to_vec())), Err(CtrError::Format(_))));
    }

    #[test]
    fn test_missing_chunks() {
        let no_data = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 16))]);
        assert!(matches!(parse_wav(Cursor::new(no_data)), Err(CtrError::Format(_))));

        let no_fmt = riff(&[chunk(b"data", &[0, 0])]);
        assert!(matches!(parse_wav(Cursor::new(no_fmt)), Err(CtrError::Format(_))));
    }

    #[test]
    fn test_compressed_format_rejected() {
        // Format tag 2 is Microsoft ADPCM
        let bytes = riff(&[
            chunk(b"fmt ", &fmt_body(2, 1, 8000, 4)),
            chunk(b"data", &[0, 0]),
        ]);
        assert!(matches!(
            parse_wav(Cursor::new(bytes)),
            Err(CtrError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_data() {
        let mut bytes = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
            chunk(b"data", &[1, 2, 3, 4, 5, 6]),
        ]);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(parse_wav(Cursor::new(bytes)), Err(CtrError::Format(_))));
    }

    #[test]
    fn test_downmix_truncates_toward_zero() {
        assert_eq!(downmix_to_mono(&[1, 2, -1, -2, 100, 300], 2), vec![1, -1, 200]);
        assert_eq!(downmix_to_mono(&[3, 3, 4], 3), vec![3]);
        assert_eq!(downmix_to_mono(&[7, 8], 1), vec![7, 8]);
    }

    #[test]
    fn test_read_mono_pcm16() {
        let bytes = hound_wav(2, 16, &[1000, 3000, -5, -6]);
        let (format, samples) = read_mono_pcm16(Cursor::new(bytes)).unwrap();
        assert_eq!(format.channels, 2);
        assert_eq!(samples, vec![2000, -5]);
    }

    #[test]
    fn test_read_mono_rejects_8_bit() {
        let bytes = hound_wav(1, 8, &[1, 2]);
        assert!(matches!(
            read_mono_pcm16(Cursor::new(bytes)),
            Err(CtrError::UnsupportedFormat(_))
        ));
    }
}
