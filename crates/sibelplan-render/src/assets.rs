//! Asset loading abstraction for symbol SVG files.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to fetch asset '{reference}': {message}")]
    Fetch { reference: String, message: String },
    #[error("failed to parse asset '{reference}': {message}")]
    Parse { reference: String, message: String },
}

/// Source of SVG asset text, keyed by catalog references like
/// `assets/symbols/rz_iso_base.svg`.
pub trait AssetSource {
    fn fetch(&self, reference: &str) -> BoxFuture<'_, Result<String, AssetError>>;
}

/// Reads assets from a directory on disk.
pub struct FileAssetSource {
    base: PathBuf,
}

impl FileAssetSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl AssetSource for FileAssetSource {
    fn fetch(&self, reference: &str) -> BoxFuture<'_, Result<String, AssetError>> {
        let result = std::fs::read_to_string(self.base.join(reference)).map_err(|e| {
            AssetError::Fetch {
                reference: reference.to_string(),
                message: e.to_string(),
            }
        });
        Box::pin(async move { result })
    }
}

/// In-memory asset source for tests.
#[derive(Default)]
pub struct MemoryAssetSource {
    entries: HashMap<String, String>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: &str, svg: &str) {
        self.entries.insert(reference.to_string(), svg.to_string());
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, reference: &str) -> BoxFuture<'_, Result<String, AssetError>> {
        let result = self
            .entries
            .get(reference)
            .cloned()
            .ok_or_else(|| AssetError::Fetch {
                reference: reference.to_string(),
                message: "not found".to_string(),
            });
        Box::pin(async move { result })
    }
}
