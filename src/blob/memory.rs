//! In-memory object store
//!
//! Test double and dev backend: a mutex-guarded map from path to bytes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::{BlobError, BlobResult};
use super::BlobStore;

/// Shared in-memory blob store
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all stored blobs (test assertions)
    pub fn paths(&self) -> Vec<String> {
        let blobs = self.blobs.lock().expect("blob mutex poisoned");
        let mut paths: Vec<String> = blobs.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("blob mutex poisoned").len()
    }

    /// Whether the store holds no blobs
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, path: &str) -> BlobResult<Vec<u8>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| BlobError::Unavailable("blob mutex poisoned".into()))?;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    fn put(&self, path: &str, bytes: &[u8]) -> BlobResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| BlobError::Unavailable("blob mutex poisoned".into()))?;
        blobs.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}
