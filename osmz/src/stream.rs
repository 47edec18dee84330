//! Adapters between the codec traits and `std::io`.

use crate::compression::{Compressor, Decompressor};
use crate::error::Result;
use std::io::{self, BufRead, Read, Write};

/// Decompressed chunks of a stream, ending at the first empty read. The
/// decompressor is never asked for more after that.
pub struct Chunks<'d, D: ?Sized> {
    d: &'d mut D,
    done: bool,
}

impl<'d, D: Decompressor + ?Sized> Chunks<'d, D> {
    pub fn new(d: &'d mut D) -> Self {
        Self { d, done: false }
    }
}

impl<'d, D: Decompressor + ?Sized> Iterator for Chunks<'d, D> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Result<Vec<u8>>> {
        if self.done {
            return None;
        }

        match self.d.read() {
            Ok(chunk) if chunk.is_empty() => {
                self.done = true;
                None
            }
            Ok(chunk) => Some(Ok(chunk)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

pub struct DecompressorReader<D> {
    d: D,
    buf: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<D: Decompressor> DecompressorReader<D> {
    pub fn new(d: D) -> Self {
        Self {
            d,
            buf: Vec::new(),
            pos: 0,
            done: false,
        }
    }

    pub fn get_ref(&self) -> &D {
        &self.d
    }

    pub fn into_inner(self) -> D {
        self.d
    }
}

impl<D: Decompressor> Read for DecompressorReader<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let num = {
            let mut avail = self.fill_buf()?;
            avail.read(buf)?
        };
        self.consume(num);
        Ok(num)
    }
}

impl<D: Decompressor> BufRead for DecompressorReader<D> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.pos >= self.buf.len() && !self.done {
            self.buf = self.d.read()?;
            self.pos = 0;
            if self.buf.is_empty() {
                self.done = true;
            }
        }

        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

pub struct CompressorWriter<C> {
    c: C,
}

impl<C: Compressor> CompressorWriter<C> {
    pub fn new(c: C) -> Self {
        Self { c }
    }

    pub fn get_ref(&self) -> &C {
        &self.c
    }

    /// Close the compressor and hand it back, so its `file_size()` can be
    /// inspected.
    pub fn finish(mut self) -> Result<C> {
        self.c.close()?;
        Ok(self.c)
    }
}

impl<C: Compressor> Write for CompressorWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.c.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Move everything `d` produces into `c`. Returns the number of
/// uncompressed bytes moved. Neither side is closed.
pub fn copy<D, C>(d: &mut D, c: &mut C) -> Result<u64>
where
    D: Decompressor + ?Sized,
    C: Compressor + ?Sized,
{
    let mut total = 0u64;
    for chunk in Chunks::new(d) {
        let chunk = chunk?;
        c.write(&chunk)?;
        total += chunk.len() as u64;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::none::tests::{ChunkedSource, RecordingSink};
    use crate::compression::{DummyDecompressor, NoCompressor, NoDecompressor};
    use crate::file_compression::Fsync;

    #[test]
    fn chunks_stop_at_end_of_stream() {
        let mut d = NoDecompressor::new(ChunkedSource::new(&[b"way ", b"node"]));
        let chunks: Vec<_> = Chunks::new(&mut d).map(|c| c.unwrap()).collect();
        assert_eq!(chunks, vec![b"way ".to_vec(), b"node".to_vec()]);
    }

    #[test]
    fn chunks_of_placeholder_are_empty() {
        let mut d = DummyDecompressor::new();
        assert_eq!(Chunks::new(&mut d).count(), 0);
    }

    #[test]
    fn reader_reads_lines() {
        let d = NoDecompressor::new(ChunkedSource::new(&[b"node 1\nno", b"de 2\n"]));
        let r = DecompressorReader::new(d);
        let lines: Vec<String> = r.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["node 1", "node 2"]);
    }

    #[test]
    fn reader_over_boxed_decompressor() {
        let d: Box<dyn Decompressor + '_> = Box::new(NoDecompressor::from_buffer(b"relation"));
        let mut r = DecompressorReader::new(d);
        let mut out = String::new();
        r.read_to_string(&mut out).unwrap();
        assert_eq!(out, "relation");
        assert_eq!(r.get_ref().offset(), 8);

        // exhausted readers keep returning 0 without touching the decompressor
        let mut buf = [0u8; 4];
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn writer_and_copy() {
        let sink = RecordingSink::default();
        let mut w = CompressorWriter::new(NoCompressor::new(sink.clone(), Fsync::No));
        write!(w, "<osm>").unwrap();
        let mut c = w.finish().unwrap();
        assert_eq!(c.file_size(), 5);

        let sink = RecordingSink::default();
        let mut c2 = NoCompressor::new(sink.clone(), Fsync::No);
        let mut d = NoDecompressor::new(ChunkedSource::new(&[b"ab", b"cd"]));
        assert_eq!(copy(&mut d, &mut c2).unwrap(), 4);
        c2.close().unwrap();
        assert_eq!(sink.bytes(), b"abcd");

        c.close().unwrap();
    }
}
