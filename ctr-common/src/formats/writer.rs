//! Two-pass block writer
//!
//! Fixed fields are appended as they are known. Sizes and offsets that
//! depend on later data are reserved as zeroed [`Placeholder`]s, patched
//! once the payload is written, and applied in a single pass by
//! [`BlockWriter::finish`].

use crate::error::{CtrError, Result};

/// Handle to a reserved region of a [`BlockWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(usize);

#[derive(Debug)]
struct Slot {
    offset: usize,
    width: usize,
    value: Option<Vec<u8>>,
}

/// Growable little-endian buffer with backpatched placeholders
#[derive(Debug, Default)]
pub struct BlockWriter {
    buf: Vec<u8>,
    slots: Vec<Slot>,
}

impl BlockWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write offset
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_magic(&mut self, magic: &[u8; 4]) {
        self.write_bytes(magic);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    /// Zero-pad to the next multiple of `alignment` (absolute offset)
    pub fn align(&mut self, alignment: usize) {
        let rem = self.buf.len() % alignment;
        if rem != 0 {
            self.write_zeros(alignment - rem);
        }
    }

    /// Reserve `width` zero bytes to be patched later
    pub fn reserve(&mut self, width: usize) -> Placeholder {
        let offset = self.position();
        self.write_zeros(width);
        self.slots.push(Slot {
            offset,
            width,
            value: None,
        });
        Placeholder(self.slots.len() - 1)
    }

    pub fn reserve_u32(&mut self) -> Placeholder {
        self.reserve(4)
    }

    pub fn reserve_reference(&mut self) -> Placeholder {
        self.reserve(Reference::SIZE)
    }

    /// Queue `bytes` for the reserved region; applied by [`finish`](Self::finish)
    pub fn patch(&mut self, placeholder: Placeholder, bytes: &[u8]) {
        if let Some(slot) = self.slots.get_mut(placeholder.0) {
            slot.value = Some(bytes.to_vec());
        }
    }

    pub fn patch_u32(&mut self, placeholder: Placeholder, value: u32) {
        self.patch(placeholder, &value.to_le_bytes());
    }

    pub fn patch_reference(&mut self, placeholder: Placeholder, reference: &Reference) {
        self.patch(placeholder, &reference.to_bytes());
    }

    /// Apply every queued patch and return the buffer
    ///
    /// # Errors
    /// `InvalidState` if a placeholder was never patched or a patch does not
    /// match the reserved width
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut buf = self.buf;
        for slot in self.slots {
            let value = slot.value.ok_or_else(|| {
                CtrError::InvalidState(format!(
                    "placeholder at 0x{:X} was never patched",
                    slot.offset
                ))
            })?;
            if value.len() != slot.width {
                return Err(CtrError::InvalidState(format!(
                    "patch at 0x{:X} is {} bytes, reserved {}",
                    slot.offset,
                    value.len(),
                    slot.width
                )));
            }
            buf[slot.offset..slot.offset + slot.width].copy_from_slice(&value);
        }
        Ok(buf)
    }
}

/// `(magic, offset, size)` tuple pointing at a block inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub magic: [u8; 4],
    pub offset: u32,
    pub size: u32,
}

impl Reference {
    pub const SIZE: usize = 12;

    pub fn new(magic: &[u8; 4], offset: usize, size: usize) -> Self {
        Self {
            magic: *magic,
            offset: offset as u32,
            size: size as u32,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            magic: super::read_magic(bytes, 0)?,
            offset: super::read_u32(bytes, 4)?,
            size: super::read_u32(bytes, 8)?,
        })
    }

    /// Byte range of the referenced block
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..self.offset as usize + self.size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_fields_little_endian() {
        let mut w = BlockWriter::new();
        w.write_magic(b"TEST");
        w.write_u16(0xFEFF);
        w.write_u32(0x0102_0304);
        w.write_u8(9);
        assert_eq!(
            w.finish().unwrap(),
            vec![b'T', b'E', b'S', b'T', 0xFF, 0xFE, 0x04, 0x03, 0x02, 0x01, 9]
        );
    }

    #[test]
    fn test_placeholder_patched_in_second_pass() {
        let mut w = BlockWriter::new();
        let size = w.reserve_u32();
        w.write_bytes(&[1, 2, 3]);
        let total = w.position() as u32;
        w.patch_u32(size, total);
        assert_eq!(w.finish().unwrap(), vec![7, 0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_unpatched_placeholder_fails() {
        let mut w = BlockWriter::new();
        w.write_u8(1);
        let _ = w.reserve_u32();
        assert!(matches!(w.finish(), Err(CtrError::InvalidState(_))));
    }

    #[test]
    fn test_wrong_patch_width_fails() {
        let mut w = BlockWriter::new();
        let slot = w.reserve_u32();
        w.patch(slot, &[1, 2]);
        assert!(matches!(w.finish(), Err(CtrError::InvalidState(_))));
    }

    #[test]
    fn test_align() {
        let mut w = BlockWriter::new();
        w.write_zeros(5);
        w.align(0x20);
        assert_eq!(w.position(), 0x20);
        w.align(0x20);
        assert_eq!(w.position(), 0x20);
    }

    #[test]
    fn test_reference_bytes() {
        let reference = Reference::new(b"DATA", 0x80, 0x1234);
        let bytes = reference.to_bytes();
        assert_eq!(&bytes[0..4], b"DATA");
        assert_eq!(&bytes[4..8], &[0x80, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[0x34, 0x12, 0, 0]);
        assert_eq!(Reference::from_bytes(&bytes), Some(reference));
        assert_eq!(Reference::from_bytes(&bytes[..11]), None);
        assert_eq!(reference.range(), 0x80..0x80 + 0x1234);
    }
}
