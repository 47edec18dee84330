use osmz::stream::{copy, Chunks, DecompressorReader};
use osmz::{
    CodecOptions, CompressionRegistry, Descriptor, Error, FileCompression, Fsync,
    INPUT_BUFFER_SIZE,
};
use std::fs;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn sample_data(len: usize) -> Vec<u8> {
    let line = b"<node id=\"1\" lat=\"52.5\" lon=\"13.4\"/>\n";
    line.iter().copied().cycle().take(len).collect()
}

#[test]
fn uncompressed_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.osm");
    let registry = CompressionRegistry::new();

    let mut c = registry
        .create_compressor(FileCompression::None, Descriptor::create(&path).unwrap(), Fsync::Yes)
        .unwrap();
    c.write(b"ab").unwrap();
    c.write(b"cd").unwrap();
    c.close().unwrap();
    c.close().unwrap();
    assert_eq!(c.file_size(), 4);
    assert_eq!(fs::read(&path).unwrap(), b"abcd");

    let mut d = registry
        .create_decompressor(FileCompression::None, Descriptor::open(&path).unwrap())
        .unwrap();
    assert_eq!(d.file_size(), 4);
    assert_eq!(d.read().unwrap(), b"abcd");
    assert_eq!(d.read().unwrap(), b"");
    assert_eq!(d.offset(), 4);
    assert!(matches!(d.read(), Err(Error::EndOfStream)));
    d.close();
}

#[test]
fn empty_file_ends_immediately() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let registry = CompressionRegistry::new();
    let mut d = registry
        .create_decompressor(FileCompression::None, Descriptor::open(file.path()).unwrap())
        .unwrap();

    assert_eq!(d.file_size(), 0);
    assert!(d.read().unwrap().is_empty());
    assert_eq!(d.offset(), 0);
}

#[test]
fn large_file_is_read_in_fixed_chunks() {
    let data = sample_data(INPUT_BUFFER_SIZE * 2 + 100);
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), &data).unwrap();

    let registry = CompressionRegistry::new();
    let mut d = registry
        .create_decompressor(FileCompression::None, Descriptor::open(file.path()).unwrap())
        .unwrap();
    d.set_want_buffered_pages_removed(true);

    let mut sizes = Vec::new();
    let mut out = Vec::new();
    for chunk in Chunks::new(&mut d) {
        let chunk = chunk.unwrap();
        assert!(chunk.len() <= INPUT_BUFFER_SIZE);
        sizes.push(chunk.len());
        out.extend(chunk);
    }

    assert_eq!(out, data);
    assert_eq!(sizes.iter().sum::<usize>(), data.len());
    assert_eq!(d.offset(), data.len() as u64);
}

#[test]
fn offset_watched_from_another_thread() {
    let data = sample_data(INPUT_BUFFER_SIZE * 3 + 12345);
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), &data).unwrap();

    let registry = Arc::new(CompressionRegistry::new());
    let mut d = registry
        .create_decompressor(FileCompression::None, Descriptor::open(file.path()).unwrap())
        .unwrap();
    let total = d.file_size();
    assert_eq!(total, data.len() as u64);

    let progress = d.progress().clone();
    let done = Arc::new(AtomicBool::new(false));
    let sampler = {
        let done = done.clone();
        thread::spawn(move || {
            let mut samples = Vec::new();
            loop {
                let finished = done.load(Ordering::Acquire);
                samples.push(progress.offset());
                if finished {
                    return samples;
                }
                thread::yield_now();
            }
        })
    };

    while !d.read().unwrap().is_empty() {}
    done.store(true, Ordering::Release);

    let samples = sampler.join().unwrap();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(samples.last(), Some(&total));
}

#[test]
fn unregistered_algorithm_fails_before_io() {
    let registry = CompressionRegistry::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.osm.bz2");

    let fd = Descriptor::create(&path).unwrap();
    let err = registry
        .create_compressor(FileCompression::Bzip2, fd, Fsync::No)
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnsupportedFormat(FileCompression::Bzip2)));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[cfg(feature = "gzip")]
#[test]
fn gzip_file_roundtrip_through_registry() {
    let data = sample_data(300_000);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.osm.gz");
    let registry = CompressionRegistry::with_builtin_codecs(&CodecOptions::default());

    let compression = FileCompression::from_suffix(&path);
    assert_eq!(compression, FileCompression::Gzip);

    let mut c = registry
        .create_compressor(compression, Descriptor::create(&path).unwrap(), Fsync::No)
        .unwrap();
    for piece in data.chunks(7000) {
        c.write(piece).unwrap();
    }
    c.close().unwrap();
    let on_disk = fs::metadata(&path).unwrap().len();
    assert_eq!(c.file_size(), on_disk);
    assert!(on_disk < data.len() as u64);

    let mut prefix = [0u8; 6];
    fs::File::open(&path).unwrap().read_exact(&mut prefix).unwrap();
    assert_eq!(FileCompression::detect(&prefix), FileCompression::Gzip);

    let d = registry
        .create_decompressor(compression, Descriptor::open(&path).unwrap())
        .unwrap();
    assert_eq!(d.file_size(), on_disk);

    let mut r = DecompressorReader::new(d);
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
    assert_eq!(r.get_ref().offset(), on_disk);
}

#[cfg(all(feature = "xz", feature = "zstd"))]
#[test]
fn transcode_between_codecs() {
    let data = sample_data(100_000);
    let dir = tempfile::tempdir().unwrap();
    let xz_path = dir.path().join("a.osm.xz");
    let zst_path = dir.path().join("a.osm.zst");
    let registry = CompressionRegistry::with_builtin_codecs(&CodecOptions::with_level(3));

    let mut c = registry
        .create_compressor(FileCompression::Xz, Descriptor::create(&xz_path).unwrap(), Fsync::No)
        .unwrap();
    c.write(&data).unwrap();
    c.close().unwrap();

    let mut d = registry
        .create_decompressor(FileCompression::Xz, Descriptor::open(&xz_path).unwrap())
        .unwrap();
    let mut c = registry
        .create_compressor(FileCompression::Zstd, Descriptor::create(&zst_path).unwrap(), Fsync::Yes)
        .unwrap();
    assert_eq!(copy(&mut d, &mut c).unwrap(), data.len() as u64);
    d.close();
    c.close().unwrap();

    let compressed = fs::read(&zst_path).unwrap();
    let mut d = registry
        .create_buffer_decompressor(FileCompression::Zstd, &compressed)
        .unwrap();
    let mut out = Vec::new();
    for chunk in Chunks::new(&mut d) {
        out.extend(chunk.unwrap());
    }
    assert_eq!(out, data);
}
