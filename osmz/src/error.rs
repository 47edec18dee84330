use crate::file_compression::FileCompression;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("support for compression '{0}' not compiled into this binary")]
    UnsupportedFormat(FileCompression),

    #[error("unknown compression: {0}")]
    UnknownCompression(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `read()` was called again after it already returned an empty chunk.
    #[error("read past end of stream")]
    EndOfStream,

    #[error("stream already closed")]
    Closed,
}

impl Error {
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            Error::EndOfStream => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            err => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}
