//! Cut-short and hostile input: every failure is an error value, never a panic.

mod common;

use common::*;
use proptest::prelude::*;
use serialysis::constants::*;
use serialysis::{DecodeError, Primitive, Reader, Session, Value};

fn single_records() -> Vec<Vec<u8>> {
    let mut block = serialysis_buffers::Writer::new();
    block.utf("host").unwrap();
    block.i32(1);
    let block = block.flush();
    vec![
        StreamBuilder::new().integer(5).build(),
        StreamBuilder::new().string("noddy").build(),
        StreamBuilder::new().long_string("long").build(),
        StreamBuilder::new().int_array(&[1, 2, 3]).build(),
        StreamBuilder::new().enum_constant("Color", "RED").build(),
        StreamBuilder::new()
            .tag(TC_OBJECT)
            .class_desc("Ref", 3, SC_SERIALIZABLE | SC_WRITE_METHOD, 1)
            .object_field("name", "Ljava/lang/String;")
            .end_class()
            .null()
            .string("x")
            .block(&block)
            .end_class()
            .build(),
        StreamBuilder::new()
            .tag(TC_EXCEPTION)
            .tag(TC_OBJECT)
            .class_desc("java.io.IOException", 1, SC_SERIALIZABLE, 0)
            .end_class()
            .null()
            .build(),
    ]
}

#[test]
fn every_prefix_is_truncated_input() {
    for bytes in single_records() {
        for cut in 0..bytes.len() {
            let prefix = &bytes[..cut];
            let session = Session::open(Reader::new(prefix));
            let mut session = match session {
                Ok(s) => s,
                Err(err) => {
                    assert!(cut < 4, "header of {cut} bytes rejected: {err}");
                    assert!(matches!(err, DecodeError::TruncatedInput { .. }));
                    continue;
                }
            };
            match session.decode_next() {
                Ok(None) => assert_eq!(cut, 4),
                Ok(Some(_)) => panic!("prefix of {cut}/{} bytes decoded a record", bytes.len()),
                Err(err) => assert!(
                    matches!(err, DecodeError::TruncatedInput { .. }),
                    "prefix of {cut} bytes: {err}"
                ),
            }
        }
    }
}

#[test]
fn truncated_offset_points_at_failed_read() {
    let bytes = StreamBuilder::new().string("noddy").build();
    let mut session = Session::open(Reader::new(&bytes[..8])).unwrap();
    // tag at 4; the length-prefixed string read starts at 5
    assert_eq!(
        session.decode_next(),
        Err(DecodeError::TruncatedInput { offset: 5 })
    );
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(body in proptest::collection::vec(any::<u8>(), 0..256)) {
        let bytes = StreamBuilder::new().build().into_iter().chain(body).collect::<Vec<_>>();
        let mut session = Session::open(Reader::new(&bytes)).unwrap();
        while let Ok(Some(value)) = session.decode_next() {
            let _ = session.render(value);
        }
    }

    #[test]
    fn tagged_bytes_never_panic(body in proptest::collection::vec(0x70u8..=0x7e, 0..128)) {
        let bytes = StreamBuilder::new().build().into_iter().chain(body).collect::<Vec<_>>();
        let mut session = Session::open(Reader::new(&bytes)).unwrap();
        while let Ok(Some(value)) = session.decode_next() {
            let _ = session.render(value);
        }
    }

    #[test]
    fn primitive_fields_roundtrip(
        b in any::<i8>(),
        c in any::<u16>(),
        d in any::<f64>(),
        f in any::<f32>(),
        i in any::<i32>(),
        j in any::<i64>(),
        s in any::<i16>(),
        z in any::<bool>(),
    ) {
        let bytes = StreamBuilder::new()
            .tag(TC_OBJECT)
            .class_desc("AllKinds", 9, SC_SERIALIZABLE, 8)
            .prim_field(b'B', "b")
            .prim_field(b'C', "c")
            .prim_field(b'D', "d")
            .prim_field(b'F', "f")
            .prim_field(b'I', "i")
            .prim_field(b'J', "j")
            .prim_field(b'S', "s")
            .prim_field(b'Z', "z")
            .end_class()
            .null()
            .u8(b as u8)
            .i16(c as i16)
            .f64(d)
            .f32(f)
            .i32(i)
            .i64(j)
            .i16(s)
            .bool(z)
            .build();
        let (value, session) = serialysis::examine(&bytes).unwrap();
        let obj = session.graph().object(value).unwrap();
        let field = |name: &str| match obj.field(name) {
            Some(Value::Prim(p)) => p,
            other => panic!("field {name}: {other:?}"),
        };
        prop_assert_eq!(field("b"), Primitive::Byte(b));
        prop_assert_eq!(field("c"), Primitive::Char(c));
        match field("d") {
            Primitive::Double(v) => prop_assert_eq!(v.to_bits(), d.to_bits()),
            other => panic!("d: {other:?}"),
        }
        match field("f") {
            Primitive::Float(v) => prop_assert_eq!(v.to_bits(), f.to_bits()),
            other => panic!("f: {other:?}"),
        }
        prop_assert_eq!(field("i"), Primitive::Int(i));
        prop_assert_eq!(field("j"), Primitive::Long(j));
        prop_assert_eq!(field("s"), Primitive::Short(s));
        prop_assert_eq!(field("z"), Primitive::Boolean(z));
    }
}
