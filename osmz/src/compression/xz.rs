use super::codec::{Decode, DecodingDecompressor, Encode, EncodingCompressor};
use super::input::TrackedInput;
use super::output::TrackedSink;
use super::{Compressor, Decompressor, Progress, INPUT_BUFFER_SIZE};
use crate::compression::registry::CompressionRegistry;
use crate::error::Result;
use crate::file_compression::{FileCompression, Fsync};
use crate::platform::{Descriptor, Sink, Source};
use xz2::bufread::XzDecoder;
use xz2::write::XzEncoder;
use std::io::{self, BufReader};

pub type XzCompressor<S = Descriptor> = EncodingCompressor<XzEncoder<TrackedSink<S>>>;

pub type XzDecompressor<'a, S = Descriptor> =
    DecodingDecompressor<'a, XzDecoder<BufReader<TrackedInput<'a, S>>>>;

impl<S: Sink> Encode for XzEncoder<TrackedSink<S>> {
    const NAME: &'static str = "xz";
    type Sink = S;

    fn sink(&self) -> &TrackedSink<S> {
        self.get_ref()
    }

    fn finish(self) -> io::Result<TrackedSink<S>> {
        XzEncoder::finish(self)
    }
}

impl<'a, S: Source> Decode<'a> for XzDecoder<BufReader<TrackedInput<'a, S>>> {
    const NAME: &'static str = "xz";
    type Source = S;

    fn input(&self) -> &TrackedInput<'a, S> {
        self.get_ref().get_ref()
    }

    fn into_input(self) -> TrackedInput<'a, S> {
        self.into_inner().into_inner()
    }
}

impl<S: Sink> XzCompressor<S> {
    pub fn new(sink: S, fsync: Fsync, level: u32) -> Self {
        let w = XzEncoder::new(TrackedSink::new(sink), level);
        Self::from_encoder(w, fsync)
    }
}

impl<S: Source> XzDecompressor<'static, S> {
    pub fn new(source: S) -> Self {
        Self::with_input(TrackedInput::from_source(source, Progress::new()))
    }
}

impl<'a> XzDecompressor<'a, Descriptor> {
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        let progress = Progress::new();
        progress.set_file_size(buffer.len() as u64);
        Self::with_input(TrackedInput::from_buffer(buffer, progress))
    }
}

impl<'a, S: Source> XzDecompressor<'a, S> {
    fn with_input(input: TrackedInput<'a, S>) -> Self {
        let r = BufReader::with_capacity(INPUT_BUFFER_SIZE, input);
        // concatenated .xz files are valid input, same as for `xz -d`
        Self::from_decoder(XzDecoder::new_multi_decoder(r))
    }
}

fn create_decompressor(fd: Descriptor) -> Result<Box<dyn Decompressor>> {
    Ok(Box::new(XzDecompressor::new(fd)))
}

fn create_buffer_decompressor(buffer: &[u8]) -> Result<Box<dyn Decompressor + '_>> {
    Ok(Box::new(XzDecompressor::from_buffer(buffer)))
}

pub fn register(registry: &mut CompressionRegistry, level: u32) -> bool {
    registry.register(
        FileCompression::Xz,
        move |fd, fsync| Ok(Box::new(XzCompressor::new(fd, fsync, level)) as Box<dyn Compressor>),
        create_decompressor,
        create_buffer_decompressor,
    )
}
