//! Byte-level plumbing for serialysis.
//!
//! This crate knows nothing about the serialization protocol. It provides
//! sequential readers over byte input and the primitive encodings that the
//! protocol is built from.
//!
//! # Overview
//!
//! - [`ByteSource`] - Something bytes can be pulled from, in order
//! - [`Reader`] - A [`ByteSource`] over an in-memory byte slice
//! - [`IoSource`] - A [`ByteSource`] over any [`std::io::Read`]
//! - [`TracingSource`] - Decorator that logs every read through `tracing`
//! - [`Cursor`] - Typed big-endian reads on top of a [`ByteSource`]
//! - [`Writer`] - Writes big-endian binary data to an auto-growing buffer
//!
//! # Example
//!
//! ```
//! use serialysis_buffers::{Cursor, Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.utf("hello").unwrap();
//! let data = writer.flush();
//!
//! let mut cursor = Cursor::new(Reader::new(&data));
//! assert_eq!(cursor.u8().unwrap(), 0x01);
//! assert_eq!(cursor.u16().unwrap(), 0x0203);
//! assert_eq!(cursor.utf().unwrap(), "hello");
//! ```

mod cursor;
mod modified_utf8;
mod print_octets;
mod reader;
mod source;
mod trace;
mod writer;

pub use cursor::Cursor;
pub use modified_utf8::{decode_modified_utf8, encode_modified_utf8, modified_utf8_len};
pub use print_octets::print_octets;
pub use reader::Reader;
pub use source::{ByteSource, IoSource};
pub use trace::TracingSource;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the input.
    EndOfBuffer {
        /// Bytes the read asked for.
        needed: usize,
        /// Bytes that were actually left.
        available: usize,
    },
    /// Invalid modified UTF-8 sequence.
    InvalidModifiedUtf8,
    /// The underlying reader failed with something other than end of input.
    Io(String),
    /// A string's encoded length does not fit a 2-byte length prefix.
    StringTooLong {
        /// Encoded length in bytes.
        len: usize,
    },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { needed, available } => write!(
                f,
                "end of buffer: needed {needed} bytes, {available} available"
            ),
            BufferError::InvalidModifiedUtf8 => write!(f, "invalid modified UTF-8 sequence"),
            BufferError::Io(msg) => write!(f, "i/o error: {msg}"),
            BufferError::StringTooLong { len } => {
                write!(f, "string of {len} bytes too long for a 2-byte length prefix")
            }
        }
    }
}

impl std::error::Error for BufferError {}

impl From<std::io::Error> for BufferError {
    fn from(err: std::io::Error) -> Self {
        BufferError::Io(err.to_string())
    }
}
