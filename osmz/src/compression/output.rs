use crate::file_compression::Fsync;
use crate::platform::Sink;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Output of a compressor, counting the bytes that reach the sink.
pub struct TrackedSink<S> {
    sink: S,
    written: Arc<AtomicU64>,
}

impl<S: Sink> TrackedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            written: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicU64> {
        self.written.clone()
    }

    pub fn finish(self, fsync: Fsync) -> io::Result<()> {
        close_sink(self.sink, fsync)
    }
}

impl<S: Sink> Write for TrackedSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write_all(buf)?;
        self.written.fetch_add(buf.len() as u64, Ordering::Relaxed);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn close_sink<S: Sink>(mut sink: S, fsync: Fsync) -> io::Result<()> {
    // stdout belongs to the process, not to us
    if sink.is_stdout() {
        return Ok(());
    }

    if fsync.enabled() {
        sink.fsync()?;
    }
    sink.close()
}
