use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub mod registry;
pub use self::registry::CompressionRegistry;

pub(crate) mod codec;
pub(crate) mod input;
pub(crate) mod output;
pub use self::codec::{DecodingDecompressor, EncodingCompressor};

pub mod none;
pub use self::none::{NoCompressor, NoDecompressor};

pub mod dummy;
pub use self::dummy::DummyDecompressor;

#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "gzip")]
pub use self::gzip::{GzipCompressor, GzipDecompressor};

#[cfg(feature = "xz")]
pub mod xz;
#[cfg(feature = "xz")]
pub use self::xz::{XzCompressor, XzDecompressor};

#[cfg(feature = "zstd")]
pub mod zstd;
#[cfg(feature = "zstd")]
pub use self::zstd::{ZstdCompressor, ZstdDecompressor};

/// Maximum number of bytes requested from a source per read.
pub const INPUT_BUFFER_SIZE: usize = 1024 * 1024;

/// One-way byte sink.
pub trait Compressor: Send {
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flush and finalize. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Number of bytes that reached the destination so far.
    fn file_size(&self) -> u64;
}

/// One-way byte source.
///
/// `read()` hands out the next chunk of decompressed data. The first empty
/// chunk marks the end of the stream; reading again after that is an
/// [`Error::EndOfStream`].
pub trait Decompressor: Send {
    fn read(&mut self) -> Result<Vec<u8>>;

    /// Release the source. Idempotent, never fails.
    fn close(&mut self);

    /// False for placeholders that do not actually move bytes.
    fn is_real(&self) -> bool {
        true
    }

    fn progress(&self) -> &Arc<Progress>;

    fn file_size(&self) -> u64 {
        self.progress().file_size()
    }

    fn offset(&self) -> u64 {
        self.progress().offset()
    }

    fn want_buffered_pages_removed(&self) -> bool {
        self.progress().want_buffered_pages_removed()
    }

    fn set_want_buffered_pages_removed(&self, value: bool) {
        self.progress().set_want_buffered_pages_removed(value)
    }
}

impl<C: Compressor + ?Sized> Compressor for Box<C> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn file_size(&self) -> u64 {
        (**self).file_size()
    }
}

impl<D: Decompressor + ?Sized> Decompressor for Box<D> {
    fn read(&mut self) -> Result<Vec<u8>> {
        (**self).read()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_real(&self) -> bool {
        (**self).is_real()
    }

    fn progress(&self) -> &Arc<Progress> {
        (**self).progress()
    }
}

/// Counters a decompressor publishes while it runs. Clone the `Arc` to
/// watch them from another thread.
#[derive(Debug, Default)]
pub struct Progress {
    file_size: AtomicU64,
    offset: AtomicU64,
    want_buffered_pages_removed: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn file_size(&self) -> u64 {
        self.file_size.load(Ordering::Relaxed)
    }

    pub fn set_file_size(&self, size: u64) {
        self.file_size.store(size, Ordering::Relaxed)
    }

    pub fn offset(&self) -> u64 {
        self.offset.load(Ordering::Relaxed)
    }

    pub fn set_offset(&self, offset: u64) {
        self.offset.store(offset, Ordering::Relaxed)
    }

    pub fn want_buffered_pages_removed(&self) -> bool {
        self.want_buffered_pages_removed.load(Ordering::Relaxed)
    }

    pub fn set_want_buffered_pages_removed(&self, value: bool) {
        self.want_buffered_pages_removed
            .store(value, Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadState {
    Open,
    Ended,
    Closed,
}

impl ReadState {
    pub(crate) fn check(self) -> Result<()> {
        match self {
            ReadState::Open => Ok(()),
            ReadState::Ended => Err(Error::EndOfStream),
            ReadState::Closed => Err(Error::Closed),
        }
    }

    /// Record what a read returned; an empty chunk ends the stream.
    pub(crate) fn observe(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            *self = ReadState::Ended;
        }
    }
}
