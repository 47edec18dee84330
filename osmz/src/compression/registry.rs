//! Table of codecs, keyed by algorithm.
//!
//! Plugins add themselves with [`CompressionRegistry::register`] during
//! startup. Registration takes `&mut self` and lookups take `&self`, so once
//! a registry is shared between threads (e.g. behind an `Arc`) it is frozen.

use super::{none, Compressor, Decompressor};
use crate::error::{Error, Result};
use crate::file_compression::{FileCompression, Fsync};
use crate::options::CodecOptions;
use crate::platform::Descriptor;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

pub type CreateCompressor = dyn Fn(Descriptor, Fsync) -> Result<Box<dyn Compressor>> + Send + Sync;
pub type CreateDecompressor = dyn Fn(Descriptor) -> Result<Box<dyn Decompressor>> + Send + Sync;
pub type CreateBufferDecompressor =
    dyn for<'a> Fn(&'a [u8]) -> Result<Box<dyn Decompressor + 'a>> + Send + Sync;

struct Callbacks {
    compressor: Box<CreateCompressor>,
    decompressor: Box<CreateDecompressor>,
    buffer_decompressor: Box<CreateBufferDecompressor>,
}

pub struct CompressionRegistry {
    callbacks: HashMap<FileCompression, Callbacks>,
}

impl CompressionRegistry {
    /// A registry holding only the identity codec.
    pub fn new() -> Self {
        let mut registry = Self {
            callbacks: HashMap::new(),
        };
        none::register(&mut registry);
        registry
    }

    /// A registry with every codec compiled into this build, registered in a
    /// fixed order.
    #[allow(unused_mut, unused_variables)]
    pub fn with_builtin_codecs(options: &CodecOptions) -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "gzip")]
        super::gzip::register(&mut registry, options.gzip_level);
        #[cfg(feature = "xz")]
        super::xz::register(&mut registry, options.xz_level);
        #[cfg(feature = "zstd")]
        super::zstd::register(&mut registry, options.zstd_level);

        registry
    }

    /// Add a codec. Returns false, leaving the existing entry in place, if
    /// `compression` is already registered.
    pub fn register<C, D, B>(
        &mut self,
        compression: FileCompression,
        create_compressor: C,
        create_decompressor: D,
        create_buffer_decompressor: B,
    ) -> bool
    where
        C: Fn(Descriptor, Fsync) -> Result<Box<dyn Compressor>> + Send + Sync + 'static,
        D: Fn(Descriptor) -> Result<Box<dyn Decompressor>> + Send + Sync + 'static,
        B: for<'a> Fn(&'a [u8]) -> Result<Box<dyn Decompressor + 'a>> + Send + Sync + 'static,
    {
        match self.callbacks.entry(compression) {
            Entry::Occupied(_) => {
                debug!(%compression, "codec already registered, keeping the first one");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(Callbacks {
                    compressor: Box::new(create_compressor),
                    decompressor: Box::new(create_decompressor),
                    buffer_decompressor: Box::new(create_buffer_decompressor),
                });
                debug!(%compression, "registered codec");
                true
            }
        }
    }

    pub fn contains(&self, compression: FileCompression) -> bool {
        self.callbacks.contains_key(&compression)
    }

    /// Registered algorithms, sorted.
    pub fn ids(&self) -> Vec<FileCompression> {
        let mut ids: Vec<_> = self.callbacks.keys().copied().collect();
        ids.sort();
        ids
    }

    fn find(&self, compression: FileCompression) -> Result<&Callbacks> {
        self.callbacks
            .get(&compression)
            .ok_or(Error::UnsupportedFormat(compression))
    }

    pub fn create_compressor(
        &self,
        compression: FileCompression,
        fd: Descriptor,
        fsync: Fsync,
    ) -> Result<Box<dyn Compressor>> {
        let callbacks = self.find(compression)?;
        debug!(%compression, ?fsync, "creating compressor");
        (callbacks.compressor)(fd, fsync)
    }

    /// Create a decompressor reading from `fd`. The size of the input is
    /// recorded before the first read, when it can be determined.
    pub fn create_decompressor(
        &self,
        compression: FileCompression,
        fd: Descriptor,
    ) -> Result<Box<dyn Decompressor>> {
        let callbacks = self.find(compression)?;
        let size = match fd.size() {
            Ok(size) => size,
            Err(err) => {
                debug!(%err, "input size unknown");
                0
            }
        };

        debug!(%compression, size, "creating decompressor");
        let decompressor = (callbacks.decompressor)(fd)?;
        decompressor.progress().set_file_size(size);
        Ok(decompressor)
    }

    pub fn create_buffer_decompressor<'a>(
        &self,
        compression: FileCompression,
        buffer: &'a [u8],
    ) -> Result<Box<dyn Decompressor + 'a>> {
        let callbacks = self.find(compression)?;
        debug!(%compression, len = buffer.len(), "creating buffer decompressor");
        (callbacks.buffer_decompressor)(buffer)
    }
}

impl Default for CompressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompressionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionRegistry")
            .field("codecs", &self.ids())
            .finish()
    }
}
