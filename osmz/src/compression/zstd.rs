use super::codec::{Decode, DecodingDecompressor, Encode, EncodingCompressor};
use super::input::TrackedInput;
use super::output::TrackedSink;
use super::{Compressor, Decompressor, Progress, INPUT_BUFFER_SIZE};
use crate::compression::registry::CompressionRegistry;
use crate::error::Result;
use crate::file_compression::{FileCompression, Fsync};
use crate::platform::{Descriptor, Sink, Source};
use std::io::{self, BufReader};

pub type ZstdCompressor<S = Descriptor> = EncodingCompressor<zstd::Encoder<'static, TrackedSink<S>>>;

pub type ZstdDecompressor<'a, S = Descriptor> =
    DecodingDecompressor<'a, zstd::Decoder<'static, BufReader<TrackedInput<'a, S>>>>;

impl<S: Sink> Encode for zstd::Encoder<'static, TrackedSink<S>> {
    const NAME: &'static str = "zstd";
    type Sink = S;

    fn sink(&self) -> &TrackedSink<S> {
        self.get_ref()
    }

    fn finish(self) -> io::Result<TrackedSink<S>> {
        zstd::Encoder::finish(self)
    }
}

impl<'a, S: Source> Decode<'a> for zstd::Decoder<'static, BufReader<TrackedInput<'a, S>>> {
    const NAME: &'static str = "zstd";
    type Source = S;

    fn input(&self) -> &TrackedInput<'a, S> {
        self.get_ref().get_ref()
    }

    fn into_input(self) -> TrackedInput<'a, S> {
        self.finish().into_inner()
    }
}

impl<S: Sink> ZstdCompressor<S> {
    pub fn new(sink: S, fsync: Fsync, level: i32) -> Result<Self> {
        let w = zstd::Encoder::new(TrackedSink::new(sink), level)?;
        Ok(Self::from_encoder(w, fsync))
    }
}

impl<S: Source> ZstdDecompressor<'static, S> {
    pub fn new(source: S) -> Result<Self> {
        Self::with_input(TrackedInput::from_source(source, Progress::new()))
    }
}

impl<'a> ZstdDecompressor<'a, Descriptor> {
    pub fn from_buffer(buffer: &'a [u8]) -> Result<Self> {
        let progress = Progress::new();
        progress.set_file_size(buffer.len() as u64);
        Self::with_input(TrackedInput::from_buffer(buffer, progress))
    }
}

impl<'a, S: Source> ZstdDecompressor<'a, S> {
    fn with_input(input: TrackedInput<'a, S>) -> Result<Self> {
        let r = BufReader::with_capacity(INPUT_BUFFER_SIZE, input);
        Ok(Self::from_decoder(zstd::Decoder::with_buffer(r)?))
    }
}

fn create_decompressor(fd: Descriptor) -> Result<Box<dyn Decompressor>> {
    Ok(Box::new(ZstdDecompressor::new(fd)?))
}

fn create_buffer_decompressor(buffer: &[u8]) -> Result<Box<dyn Decompressor + '_>> {
    Ok(Box::new(ZstdDecompressor::from_buffer(buffer)?))
}

pub fn register(registry: &mut CompressionRegistry, level: i32) -> bool {
    registry.register(
        FileCompression::Zstd,
        move |fd, fsync| Ok(Box::new(ZstdCompressor::new(fd, fsync, level)?) as Box<dyn Compressor>),
        create_decompressor,
        create_buffer_decompressor,
    )
}
