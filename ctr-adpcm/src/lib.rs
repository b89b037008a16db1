//! ctr-adpcm: IMA-ADPCM codec for 3DS banner audio
//!
//! This is the IMA-ADPCM flavour produced by the 3DS banner toolchain. It uses
//! the standard IMA step and index tables, but the predictor reconstruction is
//! **not** the textbook one. Files encoded here only play back correctly when
//! the decoder replays exactly the same arithmetic, which is why the encoder's
//! final state is persisted into the CWAV INFO block.
//!
//! **This is a pure codec** - it produces the nibble stream plus a 4-byte
//! start-of-block header. The CWAV container is written by `ctr-common`.
//!
//! # Differences from standard IMA-ADPCM
//!
//! | Step | Standard IMA | ctr-adpcm |
//! |------|--------------|-----------|
//! | Sign bit | negates the whole delta | contributes `-step` |
//! | Bit 2 | `+step` | `+step >> 1` |
//! | Bit 1 | `+step >> 1` | `+step >> 2` |
//! | Bit 0 | `+step >> 2` | `+step >> 3` |
//! | Rounding | `+step >> 3` | `+step >> 4` |
//!
//! # Stream Format
//!
//! ```text
//! 0x00: predictor (i16 LE)   - state at the start of the block
//! 0x02: step_index (u8)
//! 0x03: reserved (0)
//! 0x04: nibbles, two per byte (even sample = low nibble)
//! ```
//!
//! # Usage
//!
//! ```
//! use ctr_adpcm::{decode_adpcm, encode_adpcm};
//!
//! let samples: Vec<i16> = (0..1000).map(|i| ((i % 50) * 20) as i16).collect();
//! let (encoded, state) = encode_adpcm(&samples);
//! assert_eq!(encoded.len(), 4 + samples.len().div_ceil(2));
//!
//! let decoded = decode_adpcm(&encoded, samples.len()).unwrap();
//! assert_eq!(decoded.last().copied(), Some(state.predictor));
//! ```

mod decode;
mod encode;

pub use decode::decode_adpcm;
pub use encode::{encode_adpcm, encode_adpcm_from, encoded_len};

// =============================================================================
// Constants
// =============================================================================

/// Size of the block header written before the nibble stream
pub const ADPCM_HEADER_SIZE: usize = 4;

/// Highest valid step index
pub const MAX_STEP_INDEX: u8 = 88;

/// Step-index adjustment per encoded nibble
pub const INDEX_TABLE: [i8; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

/// Quantizer step sizes (89 entries)
pub const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

// =============================================================================
// Codec State
// =============================================================================

/// Predictor state carried from one sample to the next
///
/// Encoding returns the final state so it can be stored in the container
/// header or used to seed the next encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdpcmState {
    /// Last reconstructed sample
    pub predictor: i16,
    /// Index into [`STEP_TABLE`] (0..=88)
    pub step_index: u8,
}

impl AdpcmState {
    /// Initial state: predictor 0, step index 0
    pub const fn new() -> Self {
        Self {
            predictor: 0,
            step_index: 0,
        }
    }

    /// Current quantizer step size
    #[inline]
    pub fn step(&self) -> i32 {
        STEP_TABLE[self.step_index.min(MAX_STEP_INDEX) as usize]
    }

    /// Choose the nibble for `sample` without touching the state
    ///
    /// Bit 3 is the sign; bits 2..0 are found by comparing the remaining
    /// difference against `step`, `step >> 1` and `step >> 2`.
    pub fn quantize(&self, sample: i16) -> u8 {
        let mut step = self.step();
        let mut diff = sample as i32 - self.predictor as i32;
        let mut nibble = 0u8;

        if diff < 0 {
            nibble = 8;
            diff = -diff;
        }

        if diff >= step {
            nibble |= 4;
            diff -= step;
        }
        step >>= 1;
        if diff >= step {
            nibble |= 2;
            diff -= step;
        }
        step >>= 1;
        if diff >= step {
            nibble |= 1;
        }

        nibble
    }

    /// Commit `nibble`: reconstruct the sample and adapt the step index
    ///
    /// Uses the step size from before the update. Returns the new predictor.
    pub fn apply(&mut self, nibble: u8) -> i16 {
        let nibble = nibble & 0x0F;
        let step = self.step();

        let mut delta = step >> 4;
        if nibble & 8 != 0 {
            delta -= step;
        }
        if nibble & 4 != 0 {
            delta += step >> 1;
        }
        if nibble & 2 != 0 {
            delta += step >> 2;
        }
        if nibble & 1 != 0 {
            delta += step >> 3;
        }

        self.predictor = clamp_i16(self.predictor as i32 + delta) as i16;
        self.step_index = (self.step_index as i32 + INDEX_TABLE[nibble as usize] as i32)
            .clamp(0, MAX_STEP_INDEX as i32) as u8;
        self.predictor
    }

    /// Predictor as stored in the CWAV `pred_scale` field
    pub fn pred_scale(&self) -> u16 {
        self.predictor as u16
    }

    /// Step index as stored in the CWAV `yn1` field
    pub fn yn1(&self) -> u16 {
        self.step_index as u16
    }

    /// Write the 4-byte block header for this state
    pub fn to_header(&self) -> [u8; ADPCM_HEADER_SIZE] {
        let mut bytes = [0u8; ADPCM_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.predictor.to_le_bytes());
        bytes[2] = self.step_index;
        bytes
    }

    /// Read a block header
    pub fn from_header(bytes: &[u8]) -> Result<Self, AdpcmError> {
        if bytes.len() < ADPCM_HEADER_SIZE {
            return Err(AdpcmError::TooSmall);
        }
        if bytes[2] > MAX_STEP_INDEX {
            return Err(AdpcmError::InvalidStepIndex(bytes[2]));
        }
        Ok(Self {
            predictor: i16::from_le_bytes([bytes[0], bytes[1]]),
            step_index: bytes[2],
        })
    }
}

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur during ADPCM decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdpcmError {
    /// Data is too small to contain the block header
    TooSmall,
    /// Header step index is outside 0..=88
    InvalidStepIndex(u8),
    /// Fewer nibbles than requested samples
    TruncatedData,
}

impl core::fmt::Display for AdpcmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdpcmError::TooSmall => write!(f, "data too small for ADPCM header"),
            AdpcmError::InvalidStepIndex(index) => {
                write!(f, "invalid step index {} (must be 0-88)", index)
            }
            AdpcmError::TruncatedData => write!(f, "truncated ADPCM data"),
        }
    }
}

impl std::error::Error for AdpcmError {}

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i32 {
    v.clamp(-32768, 32767)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_sine(freq: f32, sample_rate: u32, duration_sec: f32, amplitude: f32) -> Vec<i16> {
        let num_samples = (sample_rate as f32 * duration_sec) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (f32::sin(t * freq * std::f32::consts::TAU) * amplitude) as i16
            })
            .collect()
    }

    #[test]
    fn test_roundtrip_within_two_steps() {
        let original = generate_sine(50.0, 32000, 1.0, 1000.0);
        let (encoded, _) = encode_adpcm(&original);

        // Replay the decoder by hand so the step size of every sample is known
        let mut state = AdpcmState::from_header(&encoded).unwrap();
        for (i, &sample) in original.iter().enumerate() {
            let byte = encoded[ADPCM_HEADER_SIZE + i / 2];
            let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
            let step = state.step();
            let decoded = state.apply(nibble);
            let error = (sample as i32 - decoded as i32).abs();
            assert!(
                error <= 2 * step,
                "sample {}: error {} exceeds two steps ({})",
                i,
                error,
                step
            );
        }
    }

    #[test]
    fn test_decode_matches_encoder_trajectory() {
        let original = generate_sine(440.0, 32000, 0.25, 12000.0);
        let (encoded, final_state) = encode_adpcm(&original);
        let decoded = decode_adpcm(&encoded, original.len()).unwrap();

        // Re-run the encoder loop and compare every reconstructed sample
        let mut state = AdpcmState::new();
        for (i, &sample) in original.iter().enumerate() {
            let nibble = state.quantize(sample);
            assert_eq!(state.apply(nibble), decoded[i], "divergence at sample {}", i);
        }
        assert_eq!(state, final_state);
    }

    #[test]
    fn test_silence_keeps_initial_state() {
        let original = vec![0i16; 32000];
        let (encoded, state) = encode_adpcm(&original);

        assert_eq!(encoded.len(), 4 + 16000);
        assert!(encoded.iter().all(|&b| b == 0));
        assert_eq!(state, AdpcmState::new());
        assert_eq!((state.pred_scale(), state.yn1()), (0, 0));
    }

    #[test]
    fn test_state_continuity() {
        let original = generate_sine(440.0, 32000, 0.1, 8000.0);

        for split in [0, 1, 2, 333, 1599, original.len()] {
            let (_, whole) = encode_adpcm(&original);
            let (_, first) = encode_adpcm(&original[..split]);
            let (_, second) = encode_adpcm_from(&original[split..], first);
            assert_eq!(whole, second, "state mismatch for split at {}", split);
        }
    }

    #[test]
    fn test_step_index_clamps() {
        let mut state = AdpcmState::new();
        for _ in 0..100 {
            state.apply(7);
        }
        assert_eq!(state.step_index, MAX_STEP_INDEX);

        for _ in 0..100 {
            state.apply(0);
        }
        assert_eq!(state.step_index, 0);
    }

    #[test]
    fn test_predictor_clamps() {
        let (_, state) = encode_adpcm(&[i16::MAX; 4000]);
        assert_eq!(state.predictor, i16::MAX);

        let (_, state) = encode_adpcm(&[i16::MIN; 4000]);
        assert_eq!(state.predictor, i16::MIN);
    }

    #[test]
    fn test_negative_delta_uses_full_step() {
        let mut state = AdpcmState::new();
        // Sign + all magnitude bits: -7 + 3 + 1 + 0 + 0
        assert_eq!(state.apply(0xF), -3);
        assert_eq!(state.step_index, 8);
    }

    #[test]
    fn test_header_roundtrip() {
        let state = AdpcmState {
            predictor: -1234,
            step_index: 42,
        };
        let parsed = AdpcmState::from_header(&state.to_header()).unwrap();
        assert_eq!(parsed, state);
        assert_eq!(state.to_header()[3], 0);
    }

    #[test]
    fn test_pred_scale_wraps_negative_predictor() {
        let state = AdpcmState {
            predictor: -1,
            step_index: 3,
        };
        assert_eq!(state.pred_scale(), 0xFFFF);
        assert_eq!(state.yn1(), 3);
    }

    #[test]
    fn test_header_rejects_bad_step_index() {
        assert_eq!(
            AdpcmState::from_header(&[0, 0, 89, 0]),
            Err(AdpcmError::InvalidStepIndex(89))
        );
        assert_eq!(AdpcmState::from_header(&[0, 0]), Err(AdpcmError::TooSmall));
    }
}
