//! Identity codec. Always registered, so a registry is never empty.

use super::input::TrackedInput;
use super::output::close_sink;
use super::{Compressor, Decompressor, Progress, ReadState};
use crate::compression::registry::CompressionRegistry;
use crate::error::{Error, Result};
use crate::file_compression::{FileCompression, Fsync};
use crate::platform::{Descriptor, Sink, Source};
use std::sync::Arc;
use tracing::{trace, warn};

pub struct NoCompressor<S: Sink = Descriptor> {
    sink: Option<S>,
    file_size: u64,
    fsync: Fsync,
}

impl<S: Sink> NoCompressor<S> {
    pub fn new(sink: S, fsync: Fsync) -> Self {
        Self {
            sink: Some(sink),
            file_size: 0,
            fsync,
        }
    }
}

impl<S: Sink> Compressor for NoCompressor<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::Closed)?;
        sink.write_all(data)?;
        self.file_size += data.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            close_sink(sink, self.fsync)?;
        }

        Ok(())
    }

    fn file_size(&self) -> u64 {
        self.file_size
    }
}

impl<S: Sink> Drop for NoCompressor<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(%err, "failed to close uncompressed output");
        }
    }
}

pub struct NoDecompressor<'a, S: Source = Descriptor> {
    input: TrackedInput<'a, S>,
    state: ReadState,
    progress: Arc<Progress>,
}

impl<S: Source> NoDecompressor<'static, S> {
    pub fn new(source: S) -> Self {
        let progress = Progress::new();
        Self {
            input: TrackedInput::from_source(source, progress.clone()),
            state: ReadState::Open,
            progress,
        }
    }
}

impl<'a> NoDecompressor<'a, Descriptor> {
    /// Serve `buffer` as a single chunk. The buffer is borrowed, not copied
    /// until `read()`.
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        let progress = Progress::new();
        progress.set_file_size(buffer.len() as u64);
        Self {
            input: TrackedInput::from_buffer(buffer, progress.clone()),
            state: ReadState::Open,
            progress,
        }
    }
}

impl<'a, S: Source> Decompressor for NoDecompressor<'a, S> {
    fn read(&mut self) -> Result<Vec<u8>> {
        self.state.check()?;
        let chunk = self.input.read_chunk()?;
        self.state.observe(&chunk);
        trace!(len = chunk.len(), offset = self.progress.offset(), "read uncompressed chunk");
        Ok(chunk)
    }

    fn close(&mut self) {
        if self.state == ReadState::Closed {
            return;
        }

        self.state = ReadState::Closed;
        if let Err(err) = self.input.close() {
            warn!(%err, "failed to close uncompressed input");
        }
    }

    fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }
}

impl<'a, S: Source> Drop for NoDecompressor<'a, S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn create_compressor(fd: Descriptor, fsync: Fsync) -> Result<Box<dyn Compressor>> {
    Ok(Box::new(NoCompressor::new(fd, fsync)))
}

fn create_decompressor(fd: Descriptor) -> Result<Box<dyn Decompressor>> {
    Ok(Box::new(NoDecompressor::new(fd)))
}

fn create_buffer_decompressor(buffer: &[u8]) -> Result<Box<dyn Decompressor + '_>> {
    Ok(Box::new(NoDecompressor::from_buffer(buffer)))
}

pub fn register(registry: &mut CompressionRegistry) -> bool {
    registry.register(
        FileCompression::None,
        create_compressor,
        create_decompressor,
        create_buffer_decompressor,
    )
}
