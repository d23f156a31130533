//! In-memory byte source with cursor tracking.

use crate::{BufferError, ByteSource};

/// A [`ByteSource`] that reads from a byte slice.
///
/// The reader maintains a cursor position; every read is bounds-checked
/// and fails with [`BufferError::EndOfBuffer`] instead of panicking.
///
/// # Example
///
/// ```
/// use serialysis_buffers::{ByteSource, Reader};
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.buf(2).unwrap(), &[0x01, 0x02]);
/// assert_eq!(reader.size(), 2);
/// assert_eq!(reader.peek().unwrap(), Some(0x03));
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        let end = uint8.len();
        Self { uint8, x: 0, end }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.x >= self.end
    }

    fn assert_size(&self, size: usize) -> Result<(), BufferError> {
        if size > self.size() {
            return Err(BufferError::EndOfBuffer {
                needed: size,
                available: self.size(),
            });
        }
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.assert_size(size)?;
        let x = self.x;
        self.x += size;
        Ok(&self.uint8[x..self.x])
    }
}

impl ByteSource for Reader<'_> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError> {
        let bytes = self.buf(buf.len())?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        Ok(if self.is_empty() {
            None
        } else {
            Some(self.uint8[self.x])
        })
    }

    fn position(&self) -> usize {
        self.x
    }

    fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        Ok(self.buf(n)?.to_vec())
    }
}
