//! Diagnostic decorator that logs every read.

use tracing::trace;

use crate::{print_octets, BufferError, ByteSource};

/// Maximum number of bytes shown per trace event.
const SHOWN: usize = 32;

/// Wraps a [`ByteSource`] and emits a `TRACE` event for every read.
///
/// Each typed read on a [`Cursor`](crate::Cursor) maps to one call on the
/// source, so the log shows one line per primitive with its offset, width
/// and bytes. Events go to the `serialysis::read` target:
///
/// ```text
/// RUST_LOG=serialysis::read=trace
/// ```
pub struct TracingSource<S> {
    inner: S,
}

impl<S: ByteSource> TracingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ByteSource> ByteSource for TracingSource<S> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BufferError> {
        let offset = self.inner.position();
        match self.inner.read_into(buf) {
            Ok(()) => {
                trace!(
                    target: "serialysis::read",
                    offset,
                    len = buf.len(),
                    bytes = %print_octets(buf, SHOWN),
                    "read"
                );
                Ok(())
            }
            Err(err) => {
                trace!(target: "serialysis::read", offset, len = buf.len(), error = %err, "read failed");
                Err(err)
            }
        }
    }

    fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        let next = self.inner.peek()?;
        trace!(target: "serialysis::read", offset = self.inner.position(), ?next, "peek");
        Ok(next)
    }

    fn position(&self) -> usize {
        self.inner.position()
    }

    fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        let offset = self.inner.position();
        let out = self.inner.read_vec(n);
        match &out {
            Ok(bytes) => trace!(
                target: "serialysis::read",
                offset,
                len = n,
                bytes = %print_octets(bytes, SHOWN),
                "read"
            ),
            Err(err) => {
                trace!(target: "serialysis::read", offset, len = n, error = %err, "read failed")
            }
        }
        out
    }
}
