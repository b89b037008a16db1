//! LZ11 compressor
//!
//! Greedy: each slot takes the longest match available at the current
//! position. Displacements are searched nearest first and only a strictly
//! longer match replaces the current best, so ties go to the nearest copy.

use crate::{
    LZ11_HEADER_SIZE, LZ11_MAGIC, MAX_MATCH_LENGTH, MAX_SHORT_SIZE, MIN_MATCH_LENGTH, WINDOW_SIZE,
};

/// A back-reference candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    pub displacement: usize,
    pub length: usize,
}

/// Compress `data` into an LZ11 stream
///
/// Never fails. Empty input produces the bare header `[0x11, 0, 0, 0]`.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(LZ11_HEADER_SIZE + data.len() + data.len() / 8 + 1);
    write_header(&mut output, data.len());

    let mut position = 0;
    while position < data.len() {
        let indicator_pos = output.len();
        output.push(0);
        let mut indicator = 0u8;

        for slot in 0..8 {
            if position >= data.len() {
                break;
            }

            match find_best_match(data, position) {
                Some(m) => {
                    indicator |= 0x80 >> slot;
                    encode_reference(&mut output, m);
                    position += m.length;
                }
                None => {
                    output.push(data[position]);
                    position += 1;
                }
            }
        }

        output[indicator_pos] = indicator;
    }

    output
}

fn write_header(output: &mut Vec<u8>, size: usize) {
    output.push(LZ11_MAGIC);
    if size <= MAX_SHORT_SIZE {
        output.extend_from_slice(&(size as u32).to_le_bytes()[..3]);
    } else {
        output.extend_from_slice(&[0, 0, 0]);
        output.extend_from_slice(&(size as u32).to_le_bytes());
    }
}

/// Longest match for `position` within the window, if at least 3 bytes long
pub(crate) fn find_best_match(data: &[u8], position: usize) -> Option<Match> {
    let max_length = (data.len() - position).min(MAX_MATCH_LENGTH);
    if max_length < MIN_MATCH_LENGTH {
        return None;
    }

    let window = position.min(WINDOW_SIZE);
    let target = &data[position..position + max_length];
    let mut best = Match {
        displacement: 0,
        length: 0,
    };

    for displacement in 1..=window {
        let start = position - displacement;
        if data[start] != target[0] {
            continue;
        }

        // The candidate may overlap the target; that is a valid LZ copy
        let length = data[start..start + max_length]
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();

        if length > best.length {
            best = Match {
                displacement,
                length,
            };
            if length == max_length {
                break;
            }
        }
    }

    (best.length >= MIN_MATCH_LENGTH).then_some(best)
}

/// Append the 2-, 3- or 4-byte token for `m`
fn encode_reference(output: &mut Vec<u8>, m: Match) {
    let disp = m.displacement - 1;
    let disp_hi = ((disp >> 8) & 0x0F) as u8;
    let disp_lo = (disp & 0xFF) as u8;

    if m.length <= 0x10 {
        output.push((((m.length - 1) as u8) << 4) | disp_hi);
        output.push(disp_lo);
    } else if m.length <= 0x110 {
        let len = m.length - 0x11;
        output.push((len >> 4) as u8);
        output.push((((len & 0x0F) as u8) << 4) | disp_hi);
        output.push(disp_lo);
    } else {
        let len = m.length - 0x111;
        output.push(0x10 | ((len >> 12) & 0x0F) as u8);
        output.push(((len >> 4) & 0xFF) as u8);
        output.push((((len & 0x0F) as u8) << 4) | disp_hi);
        output.push(disp_lo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(displacement: usize, length: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_reference(
            &mut out,
            Match {
                displacement,
                length,
            },
        );
        out
    }

    #[test]
    fn test_two_byte_token() {
        assert_eq!(encoded(1, 3), vec![0x20, 0x00]);
        assert_eq!(encoded(0x234, 16), vec![0xF2, 0x33]);
    }

    #[test]
    fn test_three_byte_token() {
        assert_eq!(encoded(1, 17), vec![0x00, 0x00, 0x00]);
        assert_eq!(encoded(4096, 272), vec![0x0F, 0xFF, 0xFF]);
    }

    #[test]
    fn test_four_byte_token() {
        assert_eq!(encoded(2, 273), vec![0x10, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_find_match_prefers_nearest() {
        // "abc" appears at displacement 3 and 6; both give length 3
        let data = b"abcabcabc";
        let m = find_best_match(data, 6).unwrap();
        assert_eq!(m.displacement, 3);
        assert_eq!(m.length, 3);
    }

    #[test]
    fn test_find_match_prefers_longer() {
        // Nearest "ab" copy is short; the farther one continues to "abcd"
        let data = b"abcdxxabyyabcd";
        let m = find_best_match(data, 10).unwrap();
        assert_eq!(m.displacement, 10);
        assert_eq!(m.length, 4);
    }

    #[test]
    fn test_find_match_overlapping_run() {
        let data = [9u8; 50];
        let m = find_best_match(&data, 1).unwrap();
        assert_eq!(m.displacement, 1);
        assert_eq!(m.length, 49);
    }

    #[test]
    fn test_find_match_respects_window() {
        let mut data = b"xyz".to_vec();
        data.extend(std::iter::repeat_n(0u8, WINDOW_SIZE));
        data.extend_from_slice(b"xyz");
        let position = data.len() - 3;
        assert_eq!(find_best_match(&data, position), None);
    }

    #[test]
    fn test_short_tail_is_literal() {
        assert_eq!(find_best_match(b"aaaa", 2), None);
    }

    #[test]
    fn test_indicator_bits() {
        // Literal 'a', then one reference covering the rest
        let packed = compress(b"aaaaaaaaaa");
        assert_eq!(&packed[..4], &[0x11, 10, 0, 0]);
        assert_eq!(packed[4], 0b0100_0000);
        assert_eq!(packed[5], b'a');
        // length 9, displacement 1
        assert_eq!(&packed[6..], &[0x80, 0x00]);
    }
}
