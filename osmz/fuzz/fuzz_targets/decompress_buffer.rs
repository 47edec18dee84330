#![no_main]

use libfuzzer_sys::fuzz_target;
use osmz::stream::Chunks;
use osmz::{CodecOptions, CompressionRegistry, FileCompression};

fuzz_target!(|data: &[u8]| {
    let registry = CompressionRegistry::with_builtin_codecs(&CodecOptions::default());
    let compression = FileCompression::detect(data);

    let mut d = match registry.create_buffer_decompressor(compression, data) {
        Ok(d) => d,
        Err(_) => return,
    };

    for chunk in Chunks::new(&mut d) {
        if chunk.is_err() {
            break;
        }
    }

    d.close();
});
