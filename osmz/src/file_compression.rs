use crate::error::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Compression algorithm identifier, used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FileCompression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl FileCompression {
    pub const ALL: [FileCompression; 5] = [
        FileCompression::None,
        FileCompression::Gzip,
        FileCompression::Bzip2,
        FileCompression::Xz,
        FileCompression::Zstd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCompression::None => "none",
            FileCompression::Gzip => "gzip",
            FileCompression::Bzip2 => "bzip2",
            FileCompression::Xz => "xz",
            FileCompression::Zstd => "zstd",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            FileCompression::None => "",
            FileCompression::Gzip => ".gz",
            FileCompression::Bzip2 => ".bz2",
            FileCompression::Xz => ".xz",
            FileCompression::Zstd => ".zst",
        }
    }

    pub fn from_suffix<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz") => FileCompression::Gzip,
            Some("bz2") => FileCompression::Bzip2,
            Some("xz") => FileCompression::Xz,
            Some("zst") => FileCompression::Zstd,
            _ => FileCompression::None,
        }
    }

    /// Guess the compression from the first bytes of a stream.
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(GZIP_MAGIC) {
            FileCompression::Gzip
        } else if prefix.starts_with(BZIP2_MAGIC) {
            FileCompression::Bzip2
        } else if prefix.starts_with(XZ_MAGIC) {
            FileCompression::Xz
        } else if prefix.starts_with(ZSTD_MAGIC) {
            FileCompression::Zstd
        } else {
            FileCompression::None
        }
    }

    /// Number of bytes `detect` needs to tell every format apart.
    pub const fn magic_len() -> usize {
        XZ_MAGIC.len()
    }
}

impl fmt::Display for FileCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FileCompression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "none" => Ok(FileCompression::None),
            "gzip" | "gz" => Ok(FileCompression::Gzip),
            "bzip2" | "bz2" => Ok(FileCompression::Bzip2),
            "xz" => Ok(FileCompression::Xz),
            "zstd" | "zst" => Ok(FileCompression::Zstd),
            _ => Err(Error::UnknownCompression(s.to_owned())),
        }
    }
}

/// Whether a compressor makes its output durable before closing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fsync {
    #[default]
    No,
    Yes,
}

impl Fsync {
    pub fn enabled(self) -> bool {
        self == Fsync::Yes
    }
}

impl From<bool> for Fsync {
    fn from(yes: bool) -> Self {
        if yes {
            Fsync::Yes
        } else {
            Fsync::No
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for c in FileCompression::ALL {
            assert_eq!(c.as_str().parse::<FileCompression>().unwrap(), c);
        }
        assert_eq!("gz".parse::<FileCompression>().unwrap(), FileCompression::Gzip);
        assert_eq!("zst".parse::<FileCompression>().unwrap(), FileCompression::Zstd);
        assert!(matches!(
            "lzma".parse::<FileCompression>(),
            Err(Error::UnknownCompression(name)) if name == "lzma"
        ));
    }

    #[test]
    fn suffixes() {
        assert_eq!(FileCompression::from_suffix("planet.osm.gz"), FileCompression::Gzip);
        assert_eq!(FileCompression::from_suffix("planet.osm.bz2"), FileCompression::Bzip2);
        assert_eq!(FileCompression::from_suffix("x/y.osm.zst"), FileCompression::Zstd);
        assert_eq!(FileCompression::from_suffix("y.osm.xz"), FileCompression::Xz);
        assert_eq!(FileCompression::from_suffix("planet.osm.pbf"), FileCompression::None);
        assert_eq!(FileCompression::from_suffix("-"), FileCompression::None);

        for c in FileCompression::ALL {
            let name = format!("data.osm{}", c.suffix());
            assert_eq!(FileCompression::from_suffix(name), c);
        }
    }

    #[test]
    fn magic_detection() {
        assert_eq!(FileCompression::detect(&[0x1f, 0x8b, 0x08]), FileCompression::Gzip);
        assert_eq!(FileCompression::detect(b"BZh91AY"), FileCompression::Bzip2);
        assert_eq!(
            FileCompression::detect(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, 0x00]),
            FileCompression::Xz
        );
        assert_eq!(FileCompression::detect(&[0x28, 0xb5, 0x2f, 0xfd]), FileCompression::Zstd);
        assert_eq!(FileCompression::detect(b"<?xml"), FileCompression::None);
        assert_eq!(FileCompression::detect(&[0x1f]), FileCompression::None);
        assert_eq!(FileCompression::detect(&[]), FileCompression::None);
    }

    #[test]
    fn fsync_from_bool() {
        assert_eq!(Fsync::from(true), Fsync::Yes);
        assert!(!Fsync::default().enabled());
    }
}
