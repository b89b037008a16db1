//! ADPCM encoder implementation
//!
//! Produces the 4-byte block header followed by the packed nibble stream.
//! The caller (ctr-common's CWAV writer) stores the returned final state.

use crate::{ADPCM_HEADER_SIZE, AdpcmState};

/// Encoded size in bytes for `sample_count` samples (header included)
pub fn encoded_len(sample_count: usize) -> usize {
    ADPCM_HEADER_SIZE + sample_count.div_ceil(2)
}

/// Encode mono PCM samples starting from the zero state
///
/// # Returns
/// The header + nibble stream, and the state after the last sample
pub fn encode_adpcm(samples: &[i16]) -> (Vec<u8>, AdpcmState) {
    encode_adpcm_from(samples, AdpcmState::new())
}

/// Encode mono PCM samples starting from `state`
///
/// The header records `state`, so a stream can be continued across calls:
/// the final state of one call seeds the next.
pub fn encode_adpcm_from(samples: &[i16], state: AdpcmState) -> (Vec<u8>, AdpcmState) {
    let mut output = Vec::with_capacity(encoded_len(samples.len()));
    output.extend_from_slice(&state.to_header());

    let mut state = state;
    for pair in samples.chunks(2) {
        let low = state.quantize(pair[0]);
        state.apply(low);
        let mut byte = low;

        if let Some(&sample) = pair.get(1) {
            let high = state.quantize(sample);
            state.apply(high);
            byte |= high << 4;
        }

        output.push(byte);
    }

    (output, state)
}
