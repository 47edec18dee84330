use super::codec::{Decode, DecodingDecompressor, Encode, EncodingCompressor};
use super::input::TrackedInput;
use super::output::TrackedSink;
use super::{Compressor, Decompressor, Progress, INPUT_BUFFER_SIZE};
use crate::compression::registry::CompressionRegistry;
use crate::error::Result;
use crate::file_compression::{FileCompression, Fsync};
use crate::platform::{Descriptor, Sink, Source};
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::io::{self, BufReader};

pub type GzipCompressor<S = Descriptor> = EncodingCompressor<GzEncoder<TrackedSink<S>>>;

pub type GzipDecompressor<'a, S = Descriptor> =
    DecodingDecompressor<'a, MultiGzDecoder<BufReader<TrackedInput<'a, S>>>>;

impl<S: Sink> Encode for GzEncoder<TrackedSink<S>> {
    const NAME: &'static str = "gzip";
    type Sink = S;

    fn sink(&self) -> &TrackedSink<S> {
        self.get_ref()
    }

    fn finish(self) -> io::Result<TrackedSink<S>> {
        GzEncoder::finish(self)
    }
}

impl<'a, S: Source> Decode<'a> for MultiGzDecoder<BufReader<TrackedInput<'a, S>>> {
    const NAME: &'static str = "gzip";
    type Source = S;

    fn input(&self) -> &TrackedInput<'a, S> {
        self.get_ref().get_ref()
    }

    fn into_input(self) -> TrackedInput<'a, S> {
        self.into_inner().into_inner()
    }
}

impl<S: Sink> GzipCompressor<S> {
    pub fn new(sink: S, fsync: Fsync, level: u32) -> Self {
        let w = GzEncoder::new(TrackedSink::new(sink), flate2::Compression::new(level));
        Self::from_encoder(w, fsync)
    }
}

impl<S: Source> GzipDecompressor<'static, S> {
    pub fn new(source: S) -> Self {
        Self::with_input(TrackedInput::from_source(source, Progress::new()))
    }
}

impl<'a> GzipDecompressor<'a, Descriptor> {
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        let progress = Progress::new();
        progress.set_file_size(buffer.len() as u64);
        Self::with_input(TrackedInput::from_buffer(buffer, progress))
    }
}

impl<'a, S: Source> GzipDecompressor<'a, S> {
    fn with_input(input: TrackedInput<'a, S>) -> Self {
        let r = BufReader::with_capacity(INPUT_BUFFER_SIZE, input);
        Self::from_decoder(MultiGzDecoder::new(r))
    }
}

fn create_decompressor(fd: Descriptor) -> Result<Box<dyn Decompressor>> {
    Ok(Box::new(GzipDecompressor::new(fd)))
}

fn create_buffer_decompressor(buffer: &[u8]) -> Result<Box<dyn Decompressor + '_>> {
    Ok(Box::new(GzipDecompressor::from_buffer(buffer)))
}

pub fn register(registry: &mut CompressionRegistry, level: u32) -> bool {
    registry.register(
        FileCompression::Gzip,
        move |fd, fsync| Ok(Box::new(GzipCompressor::new(fd, fsync, level)) as Box<dyn Compressor>),
        create_decompressor,
        create_buffer_decompressor,
    )
}
