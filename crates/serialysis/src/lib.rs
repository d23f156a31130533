//! Decoder for the Java object serialization stream format.
//!
//! Reads the bytes an `ObjectOutputStream` writes and rebuilds them as an
//! entity graph that can be inspected without any Java classes at hand.
//! Objects, arrays, strings, enum constants and class objects become
//! [`Entity`] values in a per-session [`Graph`]; back-references resolve to
//! the same [`EntityId`], so shared and cyclic structure is preserved.
//!
//! # Overview
//!
//! - [`Session`] - Reads top-level records from one stream
//! - [`Graph`] / [`Entity`] - The decoded entities, addressed by [`EntityId`]
//! - [`ClassTable`] / [`ClassDesc`] - Class descriptors seen in the stream
//! - [`HandleTable`] - Wire handle numbers currently assigned
//! - [`Renderer`] - Cycle-safe indented text form of a value
//!
//! # Example
//!
//! ```
//! use serialysis::examine;
//!
//! // new String[] { "a" }
//! let bytes = [
//!     0xac, 0xed, 0x00, 0x05, // header
//!     0x75, // TC_ARRAY
//!     0x72, 0x00, 0x13, b'[', b'L', b'j', b'a', b'v', b'a', b'.', b'l', b'a', b'n', b'g',
//!     b'.', b'S', b't', b'r', b'i', b'n', b'g', b';', // TC_CLASSDESC "[Ljava.lang.String;"
//!     0xad, 0xd2, 0x56, 0xe7, 0xe9, 0x1d, 0x7b, 0x47, // serialVersionUID
//!     0x02, 0x00, 0x00, // SC_SERIALIZABLE, no fields
//!     0x78, 0x70, // no annotations, no superclass
//!     0x00, 0x00, 0x00, 0x01, // length
//!     0x74, 0x00, 0x01, b'a',
//! ];
//! let (value, session) = examine(&bytes).unwrap();
//! let array = session.graph().array(value).unwrap();
//! assert_eq!(array.len(), 1);
//! assert_eq!(session.graph().text(array.elements()[0]), Some("a"));
//! assert_eq!(
//!     session.render(value),
//!     "array(java.lang.String[]){\n  string(java.lang.String){\"a\"}\n}"
//! );
//! ```

mod class_desc;
pub mod constants;
mod decoder;
mod entity;
mod error;
mod handles;
mod render;

pub use class_desc::{
    display_type_name, signature_to_java_name, ClassDesc, ClassFlags, ClassId, ClassTable,
    FieldDesc, FieldType,
};
pub use decoder::{examine, DecodeOptions, Session, DEFAULT_MAX_DEPTH};
pub use entity::{
    ClassObject, Composite, Entity, EntityId, EntityKind, Graph, OpaqueBlock, PrimKind,
    Primitive, Sequence, Value,
};
pub use error::DecodeError;
pub use handles::{HandleTable, Slot};
pub use render::{RenderOptions, Renderer, CYCLE_MARKER, DEPTH_MARKER};
pub use serialysis_buffers::{ByteSource, Cursor, IoSource, Reader, TracingSource};
