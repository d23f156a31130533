//! Typed big-endian reads over a [`ByteSource`].

use crate::{decode_modified_utf8, BufferError, ByteSource};

/// Sequential typed reader.
///
/// Wraps any [`ByteSource`] and decodes the fixed-width big-endian
/// primitives and length-prefixed strings of `java.io.DataInput`.
///
/// # Example
///
/// ```
/// use serialysis_buffers::{Cursor, Reader};
///
/// let data = [0x00, 0x00, 0x00, 0x2a, 0x40, 0x49, 0x0f, 0xdb];
/// let mut cursor = Cursor::new(Reader::new(&data));
/// assert_eq!(cursor.i32().unwrap(), 42);
/// assert!((cursor.f32().unwrap() - std::f32::consts::PI).abs() < 1e-6);
/// ```
pub struct Cursor<S> {
    src: S,
}

macro_rules! be_read {
    ($name:ident, $ty:ty, $n:expr) => {
        #[doc = concat!("Reads a big-endian `", stringify!($ty), "`.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$ty, BufferError> {
            let mut buf = [0u8; $n];
            self.src.read_into(&mut buf)?;
            Ok(<$ty>::from_be_bytes(buf))
        }
    };
}

impl<S: ByteSource> Cursor<S> {
    pub fn new(src: S) -> Self {
        Self { src }
    }

    be_read!(u8, u8, 1);
    be_read!(i8, i8, 1);
    be_read!(u16, u16, 2);
    be_read!(i16, i16, 2);
    be_read!(u32, u32, 4);
    be_read!(i32, i32, 4);
    be_read!(u64, u64, 8);
    be_read!(i64, i64, 8);
    be_read!(f32, f32, 4);
    be_read!(f64, f64, 8);

    /// Reads a `boolean` as written by `DataOutput.writeBoolean`.
    pub fn bool(&mut self) -> Result<bool, BufferError> {
        Ok(self.u8()? != 0)
    }

    /// Reads exactly `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        self.src.read_vec(n)
    }

    /// Reads `len` bytes and decodes them as modified UTF-8.
    pub fn modified_utf8(&mut self, len: usize) -> Result<String, BufferError> {
        let bytes = self.src.read_vec(len)?;
        decode_modified_utf8(&bytes)
    }

    /// Reads a string with a 2-byte length prefix (`DataInput.readUTF`).
    pub fn utf(&mut self) -> Result<String, BufferError> {
        let len = self.u16()? as usize;
        self.modified_utf8(len)
    }

    /// Reads a string with an 8-byte length prefix.
    ///
    /// A length that does not fit in `usize` can never be satisfied and is
    /// reported as [`BufferError::EndOfBuffer`].
    pub fn long_utf(&mut self) -> Result<String, BufferError> {
        let len = self.u64()?;
        let len = usize::try_from(len).map_err(|_| BufferError::EndOfBuffer {
            needed: usize::MAX,
            available: 0,
        })?;
        self.modified_utf8(len)
    }

    /// Returns the next byte without consuming it, `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        self.src.peek()
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.src.position()
    }

    pub fn get_ref(&self) -> &S {
        &self.src
    }

    pub fn into_inner(self) -> S {
        self.src
    }
}
