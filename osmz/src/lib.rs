//! Streaming compression layer for reading and writing large data files.
//!
//! Codecs are looked up by [`FileCompression`] identifier in a
//! [`CompressionRegistry`] once, when a stream is opened. Everything after
//! that goes through the [`Compressor`] and [`Decompressor`] traits.

pub mod compression;
pub mod error;
pub mod file_compression;
pub mod options;
pub mod platform;
pub mod stream;

pub use compression::registry::CompressionRegistry;
pub use compression::{Compressor, Decompressor, Progress, INPUT_BUFFER_SIZE};
pub use error::{Error, Result};
pub use file_compression::{FileCompression, Fsync};
pub use options::CodecOptions;
pub use platform::{Descriptor, Sink, Source};
