//! Builds serialization streams byte for byte, the way
//! `ObjectOutputStream` lays them out.

#![allow(dead_code)]

use serialysis::constants::*;
use serialysis_buffers::Writer;

pub const NUMBER_SUID: i64 = 0x86ac951d0b94e08bu64 as i64;
pub const INTEGER_SUID: i64 = 0x12e2a0a4f7818738;
pub const INT_ARRAY_SUID: i64 = 0x4dba602676eab2a5;
pub const INTEGER_ARRAY_SUID: i64 = 0xfe97ada00183e21bu64 as i64;
pub const STRING_ARRAY_SUID: i64 = 0xadd256e7e91d7b47u64 as i64;
pub const OBJECT_ARRAY_SUID: i64 = 0x90ce589f1073296cu64 as i64;

pub fn handle(n: u32) -> u32 {
    BASE_WIRE_HANDLE + n
}

/// A stream under construction. Methods append one record (or part of one)
/// and return `self` so layouts read top to bottom.
pub struct StreamBuilder {
    w: Writer,
}

impl StreamBuilder {
    /// Starts a stream with the magic and version header.
    pub fn new() -> Self {
        let mut w = Writer::new();
        w.u16(STREAM_MAGIC);
        w.u16(STREAM_VERSION);
        Self { w }
    }

    /// Starts a stream with no header.
    pub fn bare() -> Self {
        Self { w: Writer::new() }
    }

    pub fn build(mut self) -> Vec<u8> {
        self.w.flush()
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.w.u8(tag);
        self
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.w.u8(v);
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.w.i16(v);
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.w.i32(v);
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.w.i64(v);
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.w.f32(v);
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.w.f64(v);
        self
    }

    pub fn bool(mut self, v: bool) -> Self {
        self.w.bool(v);
        self
    }

    pub fn utf(mut self, s: &str) -> Self {
        self.w.utf(s).unwrap_or_else(|e| panic!("{e}"));
        self
    }

    pub fn null(self) -> Self {
        self.tag(TC_NULL)
    }

    pub fn reference(mut self, handle: u32) -> Self {
        self.w.u8(TC_REFERENCE);
        self.w.u32(handle);
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.w.u8(TC_STRING);
        self.w.utf(s).unwrap_or_else(|e| panic!("{e}"));
        self
    }

    pub fn long_string(mut self, s: &str) -> Self {
        self.w.u8(TC_LONGSTRING);
        self.w.long_utf(s);
        self
    }

    /// `TC_CLASSDESC`, name, suid, flags and field count. Follow with
    /// [`prim_field`](Self::prim_field) / [`object_field`](Self::object_field)
    /// calls, then [`end_class`](Self::end_class).
    pub fn class_desc(mut self, name: &str, suid: i64, flags: u8, fields: i16) -> Self {
        self.w.u8(TC_CLASSDESC);
        self.w.utf(name).unwrap_or_else(|e| panic!("{e}"));
        self.w.i64(suid);
        self.w.u8(flags);
        self.w.i16(fields);
        self
    }

    pub fn prim_field(mut self, code: u8, name: &str) -> Self {
        self.w.u8(code);
        self.w.utf(name).unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// An object field; the signature is written as a new string record.
    pub fn object_field(mut self, name: &str, sig: &str) -> Self {
        self.w.u8(sig.as_bytes()[0]);
        self.w.utf(name).unwrap_or_else(|e| panic!("{e}"));
        self.string(sig)
    }

    /// Empty class annotation then the superclass position.
    pub fn end_class(self) -> Self {
        self.tag(TC_ENDBLOCKDATA)
    }

    pub fn block(mut self, data: &[u8]) -> Self {
        self.w.u8(TC_BLOCKDATA);
        self.w.u8(data.len() as u8);
        self.w.buf(data);
        self
    }

    /// `java.lang.Number` descriptor; takes one handle.
    pub fn number_desc(self) -> Self {
        self.class_desc("java.lang.Number", NUMBER_SUID, SC_SERIALIZABLE, 0)
            .end_class()
            .null()
    }

    /// `java.lang.Integer` descriptor with its `Number` superclass; takes
    /// two handles.
    pub fn integer_desc(self) -> Self {
        self.class_desc("java.lang.Integer", INTEGER_SUID, SC_SERIALIZABLE, 1)
            .prim_field(b'I', "value")
            .end_class()
            .number_desc()
    }

    /// A new `java.lang.Integer` object. On a fresh table this assigns
    /// handles 0 (Integer desc), 1 (Number desc), 2 (the object).
    pub fn integer(self, v: i32) -> Self {
        self.tag(TC_OBJECT).integer_desc().i32(v)
    }

    pub fn int_array(self, values: &[i32]) -> Self {
        let mut b = self
            .tag(TC_ARRAY)
            .class_desc("[I", INT_ARRAY_SUID, SC_SERIALIZABLE, 0)
            .end_class()
            .null()
            .i32(values.len() as i32);
        for &v in values {
            b = b.i32(v);
        }
        b
    }

    pub fn enum_desc(self, name: &str) -> Self {
        self.class_desc(name, 0, SC_SERIALIZABLE | SC_ENUM, 0)
            .end_class()
            .class_desc("java.lang.Enum", 0, SC_SERIALIZABLE | SC_ENUM, 0)
            .end_class()
            .null()
    }

    pub fn enum_constant(self, class: &str, constant: &str) -> Self {
        self.tag(TC_ENUM).enum_desc(class).string(constant)
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}
