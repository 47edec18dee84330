use super::{Progress, INPUT_BUFFER_SIZE};
use crate::platform::Source;
use std::io::{self, Read};
use std::mem;
use std::sync::Arc;

enum Inner<'a, S> {
    Source(S),
    Buffer(&'a [u8]),
    Closed,
}

/// Raw (still compressed) input of a decompressor. Publishes how many bytes
/// were consumed and applies the page eviction hint before touching the
/// source.
pub struct TrackedInput<'a, S> {
    inner: Inner<'a, S>,
    consumed: u64,
    progress: Arc<Progress>,
}

impl<'a, S: Source> TrackedInput<'a, S> {
    pub fn from_source(source: S, progress: Arc<Progress>) -> Self {
        Self {
            inner: Inner::Source(source),
            consumed: 0,
            progress,
        }
    }

    pub fn from_buffer(buffer: &'a [u8], progress: Arc<Progress>) -> Self {
        Self {
            inner: Inner::Buffer(buffer),
            consumed: 0,
            progress,
        }
    }

    /// Up to `INPUT_BUFFER_SIZE` bytes from a source, or everything left of
    /// a buffer.
    pub fn read_chunk(&mut self) -> io::Result<Vec<u8>> {
        let chunk = match &mut self.inner {
            Inner::Source(source) => {
                if self.progress.want_buffered_pages_removed() {
                    source.remove_buffered_pages(Some(self.consumed));
                }
                let mut buf = vec![0u8; INPUT_BUFFER_SIZE];
                let num = source.read(&mut buf)?;
                buf.truncate(num);
                buf
            }
            Inner::Buffer(buffer) => mem::take(buffer).to_vec(),
            Inner::Closed => return Err(closed()),
        };

        self.advance(chunk.len());
        Ok(chunk)
    }

    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }

    pub fn close(&mut self) -> io::Result<()> {
        match mem::replace(&mut self.inner, Inner::Closed) {
            Inner::Source(source) => {
                if self.progress.want_buffered_pages_removed() {
                    source.remove_buffered_pages(None);
                }
                source.close()
            }
            _ => Ok(()),
        }
    }

    fn advance(&mut self, num: usize) {
        self.consumed += num as u64;
        self.progress.set_offset(self.consumed);
    }
}

impl<'a, S: Source> Read for TrackedInput<'a, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let num = match &mut self.inner {
            Inner::Source(source) => {
                if self.progress.want_buffered_pages_removed() {
                    source.remove_buffered_pages(Some(self.consumed));
                }
                source.read(buf)?
            }
            Inner::Buffer(buffer) => buffer.read(buf)?,
            Inner::Closed => return Err(closed()),
        };

        self.advance(num);
        Ok(num)
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "input already closed")
}

/// Fill one decompressed chunk of up to `INPUT_BUFFER_SIZE` bytes. Only
/// returns an empty chunk once `r` is exhausted.
pub(crate) fn read_decoded<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; INPUT_BUFFER_SIZE];
    let mut len = 0;
    while len < buf.len() {
        match r.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(num) => len += num,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    buf.truncate(len);
    Ok(buf)
}
