//! Wire constants of the object serialization stream protocol, version 5.

pub const STREAM_MAGIC: u16 = 0xaced;
pub const STREAM_VERSION: u16 = 5;

/// First handle assigned in a session, and again after every reset.
pub const BASE_WIRE_HANDLE: u32 = 0x7e_0000;

// Record tags
pub const TC_NULL: u8 = 0x70;
pub const TC_REFERENCE: u8 = 0x71;
pub const TC_CLASSDESC: u8 = 0x72;
pub const TC_OBJECT: u8 = 0x73;
pub const TC_STRING: u8 = 0x74;
pub const TC_ARRAY: u8 = 0x75;
pub const TC_CLASS: u8 = 0x76;
pub const TC_BLOCKDATA: u8 = 0x77;
pub const TC_ENDBLOCKDATA: u8 = 0x78;
pub const TC_RESET: u8 = 0x79;
pub const TC_BLOCKDATALONG: u8 = 0x7a;
pub const TC_EXCEPTION: u8 = 0x7b;
pub const TC_LONGSTRING: u8 = 0x7c;
pub const TC_PROXYCLASSDESC: u8 = 0x7d;
pub const TC_ENUM: u8 = 0x7e;

// Class descriptor flags
pub const SC_WRITE_METHOD: u8 = 0x01;
pub const SC_SERIALIZABLE: u8 = 0x02;
pub const SC_EXTERNALIZABLE: u8 = 0x04;
pub const SC_BLOCK_DATA: u8 = 0x08;
pub const SC_ENUM: u8 = 0x10;

/// Name of the synthetic field holding an enum constant's name.
pub const ENUM_NAME_FIELD: &str = "<name>";

/// Human-readable name of a record tag, for errors and logs.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        TC_NULL => "TC_NULL",
        TC_REFERENCE => "TC_REFERENCE",
        TC_CLASSDESC => "TC_CLASSDESC",
        TC_OBJECT => "TC_OBJECT",
        TC_STRING => "TC_STRING",
        TC_ARRAY => "TC_ARRAY",
        TC_CLASS => "TC_CLASS",
        TC_BLOCKDATA => "TC_BLOCKDATA",
        TC_ENDBLOCKDATA => "TC_ENDBLOCKDATA",
        TC_RESET => "TC_RESET",
        TC_BLOCKDATALONG => "TC_BLOCKDATALONG",
        TC_EXCEPTION => "TC_EXCEPTION",
        TC_LONGSTRING => "TC_LONGSTRING",
        TC_PROXYCLASSDESC => "TC_PROXYCLASSDESC",
        TC_ENUM => "TC_ENUM",
        _ => "unknown",
    }
}
