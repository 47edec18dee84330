/// Compression levels handed to the built-in codec plugins at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub gzip_level: u32,
    pub xz_level: u32,
    pub zstd_level: i32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            gzip_level: 6,
            xz_level: 6,
            zstd_level: 3,
        }
    }
}

impl CodecOptions {
    /// Use the same level for every codec, clamped to what each one accepts.
    pub fn with_level(level: u32) -> Self {
        Self {
            gzip_level: level.min(9),
            xz_level: level.min(9),
            zstd_level: level.clamp(1, 22) as i32,
        }
    }
}

#[test]
fn test_with_level_clamps() {
    let opts = CodecOptions::with_level(19);
    assert_eq!(opts.gzip_level, 9);
    assert_eq!(opts.xz_level, 9);
    assert_eq!(opts.zstd_level, 19);

    let opts = CodecOptions::with_level(0);
    assert_eq!(opts.gzip_level, 0);
    assert_eq!(opts.zstd_level, 1);
}
