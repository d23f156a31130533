//! Writer/Cursor matrix over both byte sources, plus the tracing decorator.

use std::io::Write;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use serialysis_buffers::{BufferError, ByteSource, Cursor, IoSource, Reader, TracingSource, Writer};

fn sample() -> Vec<u8> {
    let mut w = Writer::new();
    w.u16(0xaced);
    w.i32(-5);
    w.f32(1.5);
    w.utf("naoi").unwrap();
    w.buf(&[9, 8, 7]);
    w.flush()
}

fn read_sample<S: ByteSource>(c: &mut Cursor<S>) {
    assert_eq!(c.u16().unwrap(), 0xaced);
    assert_eq!(c.i32().unwrap(), -5);
    assert_eq!(c.f32().unwrap(), 1.5);
    assert_eq!(c.utf().unwrap(), "naoi");
    assert_eq!(c.bytes(3).unwrap(), vec![9, 8, 7]);
    assert_eq!(c.peek().unwrap(), None);
}

#[test]
fn slice_and_io_sources_agree() {
    let data = sample();
    read_sample(&mut Cursor::new(Reader::new(&data)));
    read_sample(&mut Cursor::new(IoSource::new(&data[..])));
}

fn read_all(c: &mut Cursor<Reader<'_>>) -> Result<(), BufferError> {
    c.u16()?;
    c.i32()?;
    c.f32()?;
    c.utf()?;
    c.bytes(3)?;
    Ok(())
}

#[test]
fn every_truncation_is_end_of_buffer() {
    let data = sample();
    for cut in 0..data.len() {
        let mut c = Cursor::new(Reader::new(&data[..cut]));
        let err = read_all(&mut c).unwrap_err();
        assert!(matches!(err, BufferError::EndOfBuffer { .. }), "cut at {cut}: {err}");
    }
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn tracing_source_logs_each_read() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let data = sample();
    tracing::subscriber::with_default(subscriber, || {
        let mut c = Cursor::new(TracingSource::new(Reader::new(&data)));
        read_sample(&mut c);
    });

    let log = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(log.contains("ac ed"), "{log}");
    assert!(log.contains("ff ff ff fb"), "{log}");
    assert!(log.contains("serialysis::read"), "{log}");
}

#[test]
fn tracing_source_is_transparent() {
    let data = sample();
    let mut c = Cursor::new(TracingSource::new(IoSource::new(&data[..])));
    read_sample(&mut c);
    assert_eq!(c.position(), data.len());
}

proptest! {
    #[test]
    fn roundtrip_i64(v in any::<i64>()) {
        let mut w = Writer::new();
        w.i64(v);
        let data = w.flush();
        prop_assert_eq!(Cursor::new(Reader::new(&data)).i64().unwrap(), v);
    }

    #[test]
    fn roundtrip_f64_bits(v in any::<f64>()) {
        let mut w = Writer::new();
        w.f64(v);
        let data = w.flush();
        let back = Cursor::new(Reader::new(&data)).f64().unwrap();
        prop_assert_eq!(back.to_bits(), v.to_bits());
    }

    #[test]
    fn roundtrip_utf(s in "\\PC{0,64}") {
        let mut w = Writer::new();
        w.utf(&s).unwrap();
        w.long_utf(&s);
        let data = w.flush();
        let mut c = Cursor::new(Reader::new(&data));
        prop_assert_eq!(c.utf().unwrap(), s.clone());
        prop_assert_eq!(c.long_utf().unwrap(), s);
    }
}
