//! OS-level byte primitives the codecs sit on top of.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(not(unix))]
mod generic;
#[cfg(not(unix))]
use generic as sys;

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Destination a compressor writes to.
pub trait Sink: Send {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
    fn fsync(&mut self) -> io::Result<()>;
    fn close(self) -> io::Result<()>
    where
        Self: Sized;

    /// Standard output is shared with the rest of the process and is never
    /// synced or closed by a compressor.
    fn is_stdout(&self) -> bool {
        false
    }
}

/// Source a decompressor reads from.
pub trait Source: Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size in bytes, 0 when the source has no meaningful size.
    fn size(&self) -> io::Result<u64>;

    /// Ask the OS to drop cached pages up to `upto` (the whole file for
    /// `None`). Best effort.
    fn remove_buffered_pages(&self, upto: Option<u64>);

    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

enum Kind {
    File(File),
    Stdin(io::Stdin),
    Stdout(io::Stdout),
}

/// An owned OS handle. Not `Clone`: whoever holds it is the one who closes it.
pub struct Descriptor {
    kind: Kind,
}

impl Descriptor {
    /// A `File` that wraps the process's standard output becomes
    /// [`Descriptor::stdout`], so it is never synced or closed.
    pub fn from_file(file: File) -> Self {
        match sys::release_stdout(file) {
            Some(file) => Self {
                kind: Kind::File(file),
            },
            None => Self::stdout(),
        }
    }

    pub fn stdin() -> Self {
        Self {
            kind: Kind::Stdin(io::stdin()),
        }
    }

    pub fn stdout() -> Self {
        Self {
            kind: Kind::Stdout(io::stdout()),
        }
    }

    /// Open `path` for reading; `-` is standard input.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == "-" {
            return Ok(Self::stdin());
        }

        Ok(Self::from_file(File::open(path)?))
    }

    /// Create or truncate `path` for writing; `-` is standard output.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == "-" {
            return Ok(Self::stdout());
        }

        Ok(Self::from_file(File::create(path)?))
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self.kind, Kind::Stdout(_))
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let res = match &mut self.kind {
                Kind::File(f) => f.read(buf),
                Kind::Stdin(s) => s.read(buf),
                Kind::Stdout(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "cannot read from stdout",
                    ))
                }
            };

            match res {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                res => return res,
            }
        }
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.kind {
            Kind::File(f) => f.write_all(data),
            Kind::Stdout(s) => {
                let mut lock = s.lock();
                lock.write_all(data)?;
                lock.flush()
            }
            Kind::Stdin(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot write to stdin",
            )),
        }
    }

    pub fn fsync(&mut self) -> io::Result<()> {
        match &self.kind {
            Kind::File(f) => f.sync_all(),
            _ => Ok(()),
        }
    }

    pub fn size(&self) -> io::Result<u64> {
        match &self.kind {
            Kind::File(f) => Ok(f.metadata()?.len()),
            _ => Ok(0),
        }
    }

    pub fn remove_buffered_pages(&self, upto: Option<u64>) {
        if let Kind::File(f) = &self.kind {
            if let Err(err) = sys::remove_buffered_pages(f, upto) {
                debug!(?upto, %err, "could not drop cached pages");
            }
        }
    }

    pub fn close(self) -> io::Result<()> {
        match self.kind {
            Kind::File(f) => sys::close_file(f),
            Kind::Stdout(s) => s.lock().flush(),
            Kind::Stdin(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::File(file) => f.debug_tuple("Descriptor").field(file).finish(),
            Kind::Stdin(_) => f.write_str("Descriptor(stdin)"),
            Kind::Stdout(_) => f.write_str("Descriptor(stdout)"),
        }
    }
}

impl Sink for Descriptor {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Descriptor::write_all(self, data)
    }

    fn fsync(&mut self) -> io::Result<()> {
        Descriptor::fsync(self)
    }

    fn close(self) -> io::Result<()> {
        Descriptor::close(self)
    }

    fn is_stdout(&self) -> bool {
        Descriptor::is_stdout(self)
    }
}

impl Source for Descriptor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Descriptor::read(self, buf)
    }

    fn size(&self) -> io::Result<u64> {
        Descriptor::size(self)
    }

    fn remove_buffered_pages(&self, upto: Option<u64>) {
        Descriptor::remove_buffered_pages(self, upto)
    }

    fn close(self) -> io::Result<()> {
        Descriptor::close(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.osm");

        let mut out = Descriptor::create(&path).unwrap();
        assert!(!out.is_stdout());
        out.write_all(b"<osm>").unwrap();
        out.write_all(b"</osm>").unwrap();
        out.fsync().unwrap();
        out.close().unwrap();

        let mut inp = Descriptor::open(&path).unwrap();
        assert_eq!(inp.size().unwrap(), 11);
        inp.remove_buffered_pages(Some(4));
        inp.remove_buffered_pages(None);

        let mut buf = [0u8; 64];
        let n = inp.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<osm></osm>");
        assert_eq!(inp.read(&mut buf).unwrap(), 0);
        inp.close().unwrap();
    }

    #[test]
    fn dash_means_standard_streams() {
        assert!(Descriptor::create("-").unwrap().is_stdout());
        let stdin = Descriptor::open("-").unwrap();
        assert!(!stdin.is_stdout());
        assert_eq!(stdin.size().unwrap(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_eviction_hint_is_not_fatal() {
        use std::os::unix::io::FromRawFd;

        // posix_fadvise on a pipe fails with ESPIPE
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let mut inp = Descriptor::from_file(unsafe { File::from_raw_fd(fds[0]) });
        let mut out = Descriptor::from_file(unsafe { File::from_raw_fd(fds[1]) });

        out.write_all(b"way").unwrap();
        out.close().unwrap();
        inp.remove_buffered_pages(Some(4));
        inp.remove_buffered_pages(None);

        let mut buf = [0u8; 8];
        let n = inp.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"way");
        inp.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_on_fd_one_is_stdout() {
        use std::os::unix::io::FromRawFd;

        let file = unsafe { File::from_raw_fd(libc::STDOUT_FILENO) };
        let out = Descriptor::from_file(file);
        assert!(out.is_stdout());
        out.close().unwrap();
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Descriptor::open(dir.path().join("missing.osm")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
