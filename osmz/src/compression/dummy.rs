use super::{Decompressor, Progress};
use crate::error::Result;
use std::sync::Arc;

/// Placeholder for formats whose parser reads the source itself (PBF). It
/// never produces data so the generic pipeline stays off the descriptor.
#[derive(Debug, Default)]
pub struct DummyDecompressor {
    progress: Arc<Progress>,
}

impl DummyDecompressor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decompressor for DummyDecompressor {
    fn read(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn close(&mut self) {}

    fn is_real(&self) -> bool {
        false
    }

    fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }
}

#[test]
fn test_dummy_is_always_empty() {
    let mut d = DummyDecompressor::new();
    assert!(!d.is_real());
    for _ in 0..5 {
        assert!(d.read().unwrap().is_empty());
    }
    assert_eq!(d.offset(), 0);
    assert_eq!(d.file_size(), 0);
    d.close();
    d.close();
    assert!(d.read().unwrap().is_empty());
}
