//! Binary buffer writer.

use crate::{encode_modified_utf8, modified_utf8_len, BufferError};

/// An auto-growing big-endian writer.
///
/// The counterpart of [`Cursor`](crate::Cursor): every typed read there has
/// a write here producing the same layout.
///
/// # Example
///
/// ```
/// use serialysis_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u16(0xaced);
/// writer.u16(5);
/// assert_eq!(writer.flush(), vec![0xac, 0xed, 0x00, 0x05]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Writer {
    /// The bytes written so far.
    pub uint8: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Discards everything written.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Takes the written bytes, leaving the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    pub fn i8(&mut self, val: i8) {
        self.uint8.push(val as u8);
    }

    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn i16(&mut self, val: i16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn i32(&mut self, val: i32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn u64(&mut self, val: u64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn f32(&mut self, val: f32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    pub fn bool(&mut self, val: bool) {
        self.uint8.push(val as u8);
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, data: &[u8]) {
        self.uint8.extend_from_slice(data);
    }

    /// Writes a string with a 2-byte length prefix (`DataOutput.writeUTF`).
    ///
    /// Fails with [`BufferError::StringTooLong`], writing nothing, when the
    /// encoded string does not fit the prefix.
    pub fn utf(&mut self, s: &str) -> Result<(), BufferError> {
        let len = modified_utf8_len(s);
        let len = u16::try_from(len).map_err(|_| BufferError::StringTooLong { len })?;
        self.u16(len);
        self.uint8.extend(encode_modified_utf8(s));
        Ok(())
    }

    /// Writes a string with an 8-byte length prefix.
    pub fn long_utf(&mut self, s: &str) {
        self.u64(modified_utf8_len(s) as u64);
        self.uint8.extend(encode_modified_utf8(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf_rejects_oversized_strings() {
        let mut w = Writer::new();
        let long = "x".repeat(0x1_0000);
        assert_eq!(w.utf(&long), Err(BufferError::StringTooLong { len: 0x1_0000 }));
        assert!(w.is_empty());
        w.utf(&long[1..]).unwrap();
        assert_eq!(w.len(), 2 + 0xffff);
    }
}
