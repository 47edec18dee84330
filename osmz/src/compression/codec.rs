//! Wiring shared by the codecs that sit on a streaming encoder/decoder pair.
//! A plugin only says how to finish its encoder and how to get the raw input
//! back out of its decoder.

use super::input::{read_decoded, TrackedInput};
use super::output::TrackedSink;
use super::{Compressor, Decompressor, Progress, ReadState};
use crate::error::{Error, Result};
use crate::file_compression::Fsync;
use crate::platform::{Sink, Source};
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

/// Streaming encoder writing into a [`TrackedSink`].
pub trait Encode: Write + Send + Sized {
    const NAME: &'static str;
    type Sink: Sink;

    fn sink(&self) -> &TrackedSink<Self::Sink>;

    /// Write the trailer and hand back the sink.
    fn finish(self) -> io::Result<TrackedSink<Self::Sink>>;
}

/// Streaming decoder reading from a buffered [`TrackedInput`].
pub trait Decode<'a>: Read + Send + Sized {
    const NAME: &'static str;
    type Source: Source;

    fn input(&self) -> &TrackedInput<'a, Self::Source>;

    fn into_input(self) -> TrackedInput<'a, Self::Source>;
}

pub struct EncodingCompressor<E: Encode> {
    w: Option<E>,
    written: Arc<AtomicU64>,
    fsync: Fsync,
}

impl<E: Encode> EncodingCompressor<E> {
    pub(crate) fn from_encoder(encoder: E, fsync: Fsync) -> Self {
        Self {
            written: encoder.sink().counter(),
            w: Some(encoder),
            fsync,
        }
    }
}

impl<E: Encode> Compressor for EncodingCompressor<E> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let w = self.w.as_mut().ok_or(Error::Closed)?;
        w.write_all(data)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(w) = self.w.take() {
            w.finish()?.finish(self.fsync)?;
        }

        Ok(())
    }

    fn file_size(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

impl<E: Encode> Drop for EncodingCompressor<E> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(%err, codec = E::NAME, "failed to close compressed output");
        }
    }
}

/// `'a` is the lifetime of the input buffer, `'static` for descriptors.
pub struct DecodingDecompressor<'a, D: Decode<'a>> {
    r: Option<D>,
    state: ReadState,
    progress: Arc<Progress>,
    _input: PhantomData<&'a ()>,
}

impl<'a, D: Decode<'a>> DecodingDecompressor<'a, D> {
    pub(crate) fn from_decoder(decoder: D) -> Self {
        Self {
            progress: decoder.input().progress().clone(),
            r: Some(decoder),
            state: ReadState::Open,
            _input: PhantomData,
        }
    }
}

impl<'a, D: Decode<'a>> Decompressor for DecodingDecompressor<'a, D> {
    fn read(&mut self) -> Result<Vec<u8>> {
        self.state.check()?;
        let r = self.r.as_mut().ok_or(Error::Closed)?;
        let chunk = read_decoded(r)?;
        self.state.observe(&chunk);
        trace!(
            codec = D::NAME,
            len = chunk.len(),
            offset = self.progress.offset(),
            "read decoded chunk"
        );
        Ok(chunk)
    }

    fn close(&mut self) {
        self.state = ReadState::Closed;
        if let Some(r) = self.r.take() {
            if let Err(err) = r.into_input().close() {
                warn!(%err, codec = D::NAME, "failed to close compressed input");
            }
        }
    }

    fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }
}

impl<'a, D: Decode<'a>> Drop for DecodingDecompressor<'a, D> {
    fn drop(&mut self) {
        self.close();
    }
}
