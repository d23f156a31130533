//! Decoder error type.

use serialysis_buffers::BufferError;
use thiserror::Error;

use crate::entity::EntityId;

/// Everything that can end a decoding session.
///
/// The stream format has no way to resynchronise, so every variant is
/// terminal for the [`Session`](crate::Session) that produced it. Entities
/// completed before the failure stay valid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("truncated input at offset {offset}")]
    TruncatedInput { offset: usize },
    #[error("malformed class descriptor: {0}")]
    MalformedDescriptor(String),
    #[error("reference to unassigned handle 0x{0:x}")]
    DanglingReference(u32),
    #[error("unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("tag 0x{tag:02x} not allowed at offset {offset}")]
    UnexpectedTag { tag: u8, offset: usize },
    #[error("producer aborted serialization with {class_name}")]
    UpstreamAbort {
        /// The throwable the producer wrote, readable through the session graph.
        exception: EntityId,
        class_name: String,
    },
    #[error("nesting deeper than {0} levels")]
    RecursionLimitExceeded(usize),
    #[error("bad stream magic 0x{0:04x}")]
    InvalidMagic(u16),
    #[error("unsupported stream version {0}")]
    UnsupportedVersion(u16),
    #[error("invalid length {0}")]
    InvalidLength(i64),
    #[error("invalid modified UTF-8 at offset {offset}")]
    InvalidModifiedUtf8 { offset: usize },
    #[error("i/o error: {0}")]
    Io(String),
    #[error("session already terminated by an earlier error")]
    SessionTerminated,
}

impl DecodeError {
    /// Maps a byte-level failure observed at `offset`.
    pub(crate) fn from_buffer(err: BufferError, offset: usize) -> Self {
        match err {
            BufferError::EndOfBuffer { .. } => DecodeError::TruncatedInput { offset },
            BufferError::InvalidModifiedUtf8 => DecodeError::InvalidModifiedUtf8 { offset },
            BufferError::Io(msg) => DecodeError::Io(msg),
            BufferError::StringTooLong { len } => DecodeError::InvalidLength(len as i64),
        }
    }
}
