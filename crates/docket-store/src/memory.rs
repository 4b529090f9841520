//! In-memory store

use async_trait::async_trait;
use docket_domain::{DocumentStore, FileRef, StoreError};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    containers: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    forbidden: HashSet<String>,
    deleted: Vec<String>,
}

/// Store backed by a map, for tests
///
/// Clones share the same contents and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    download_latency: Duration,
    downloads_in_flight: Arc<AtomicUsize>,
    max_downloads_in_flight: Arc<AtomicUsize>,
    download_count: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Empty store with no containers
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every download
    pub fn with_download_latency(mut self, latency: Duration) -> Self {
        self.download_latency = latency;
        self
    }

    /// Create an empty container
    pub fn create_container(&self, container: &str) {
        self.state
            .lock()
            .unwrap()
            .containers
            .entry(container.to_string())
            .or_default();
    }

    /// Add or replace an object, creating the container if needed
    pub fn insert(&self, container: &str, path: &str, bytes: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(path.to_string(), bytes.into());
    }

    /// Make downloads of `path` fail with `Forbidden`
    pub fn forbid(&self, path: &str) {
        self.state.lock().unwrap().forbidden.insert(path.to_string());
    }

    /// Paths in a container, sorted
    pub fn paths(&self, container: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(container)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Paths removed through `delete`, in order
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Downloads completed or started
    pub fn download_count(&self) -> usize {
        self.download_count.load(Ordering::SeqCst)
    }

    /// Highest number of downloads that were running at the same time
    pub fn max_concurrent_downloads(&self) -> usize {
        self.max_downloads_in_flight.load(Ordering::SeqCst)
    }

    fn lookup(&self, file: &FileRef) -> Result<Vec<u8>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.forbidden.contains(&file.path) {
            return Err(StoreError::Forbidden(file.path.clone()));
        }
        state
            .containers
            .get(&file.container)
            .and_then(|objects| objects.get(&file.path))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", file.container, file.path)))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_files(&self, container: &str) -> Result<Vec<FileRef>, StoreError> {
        let state = self.state.lock().unwrap();
        let objects = state
            .containers
            .get(container)
            .ok_or_else(|| StoreError::NotFound(container.to_string()))?;
        Ok(objects
            .iter()
            .map(|(path, bytes)| FileRef::new(container, path.clone(), bytes.len() as u64))
            .collect())
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, StoreError> {
        self.download_count.fetch_add(1, Ordering::SeqCst);
        let now = self.downloads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_downloads_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.download_latency.is_zero() {
            tokio::time::sleep(self.download_latency).await;
        }
        let result = self.lookup(file);
        self.downloads_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, StoreError> {
        let size = bytes.len() as u64;
        self.insert(container, path, bytes);
        Ok(FileRef::new(container, path, size))
    }

    async fn delete(&self, file: &FileRef) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let removed = state
            .containers
            .get_mut(&file.container)
            .and_then(|objects| objects.remove(&file.path));
        match removed {
            Some(_) => {
                state.deleted.push(file.path.clone());
                Ok(())
            }
            None => Err(StoreError::NotFound(file.path.clone())),
        }
    }
}
