//! Sequential, forward-only byte sources.

use std::io::{ErrorKind, Read};

use crate::BufferError;

/// Size of the chunks [`ByteSource::read_vec`] grows its output by.
const CHUNK: usize = 64 * 1024;

/// A forward-only supply of bytes.
///
/// Implementations never seek. A read either fills the whole request or
/// fails; there are no partial values.
pub trait ByteSource {
    /// Fills `buf` completely, or fails with [`BufferError::EndOfBuffer`].
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError>;

    /// Returns the next byte without consuming it, or `None` at end of input.
    fn peek(&mut self) -> Result<Option<u8>, BufferError>;

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Reads exactly `n` bytes into a new vector.
    ///
    /// The output grows chunk by chunk as bytes arrive, so a length prefix
    /// that lies about the amount of data cannot force a huge allocation.
    fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        let mut out = Vec::with_capacity(n.min(CHUNK));
        while out.len() < n {
            let start = out.len();
            let step = (n - start).min(CHUNK);
            out.resize(start + step, 0);
            if let Err(err) = self.read_into(&mut out[start..]) {
                return Err(match err {
                    BufferError::EndOfBuffer { available, .. } => BufferError::EndOfBuffer {
                        needed: n,
                        available: start + available,
                    },
                    other => other,
                });
            }
        }
        Ok(out)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError> {
        (**self).read_into(buf)
    }

    fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        (**self).peek()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        (**self).read_vec(n)
    }
}

/// A [`ByteSource`] over any [`Read`] implementation.
///
/// Holds at most one byte of look-ahead, taken by [`ByteSource::peek`].
pub struct IoSource<R> {
    inner: R,
    peeked: Option<u8>,
    x: usize,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            x: 0,
        }
    }

    /// Returns the wrapped reader.
    ///
    /// A byte taken by [`ByteSource::peek`] and not yet consumed is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut filled = 0;
        if let Some(b) = self.peeked.take() {
            buf[0] = b;
            filled = 1;
        }
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.x += filled;
                    return Err(BufferError::EndOfBuffer {
                        needed: buf.len(),
                        available: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        self.x += filled;
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        if self.peeked.is_none() {
            let mut byte = [0u8; 1];
            loop {
                match self.inner.read(&mut byte) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.peeked = Some(byte[0]);
                        break;
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(self.peeked)
    }

    fn position(&self) -> usize {
        self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_source_reads_in_order() {
        let data: &[u8] = &[1, 2, 3, 4];
        let mut src = IoSource::new(data);
        let mut buf = [0u8; 2];
        src.read_into(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.peek().unwrap(), Some(3));
        assert_eq!(src.position(), 2);
        src.read_into(&mut buf).unwrap();
        assert_eq!(buf, [3, 4]);
        assert_eq!(src.peek().unwrap(), None);
        assert_eq!(src.position(), 4);
    }

    #[test]
    fn io_source_short_read_is_end_of_buffer() {
        let data: &[u8] = &[1, 2, 3];
        let mut src = IoSource::new(data);
        let mut buf = [0u8; 4];
        assert_eq!(
            src.read_into(&mut buf),
            Err(BufferError::EndOfBuffer {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn read_vec_reports_total_available() {
        let data = vec![7u8; 10];
        let mut src = IoSource::new(&data[..]);
        assert_eq!(
            src.read_vec(200_000),
            Err(BufferError::EndOfBuffer {
                needed: 200_000,
                available: 10
            })
        );
    }

    #[test]
    fn read_vec_crosses_chunk_boundary() {
        let data: Vec<u8> = (0..CHUNK + 17).map(|i| i as u8).collect();
        let mut src = IoSource::new(&data[..]);
        assert_eq!(src.read_vec(data.len()).unwrap(), data);
        assert_eq!(src.peek().unwrap(), None);
    }
}
