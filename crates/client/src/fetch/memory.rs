//! In-memory resource fetcher for tests and embedded fixtures.

use super::{FetchError, ResourceFetcher};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Resources {
    texts: HashMap<String, String>,
    fetches: HashMap<String, usize>,
}

/// Serves resources from a path → text map and counts fetches per path.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: Mutex<Resources>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, path: &str, text: &str) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: &str, text: &str) {
        self.lock().texts.insert(path.to_string(), text.to_string());
    }

    /// Number of `fetch_text` calls made for `path`.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.lock().fetches.get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.lock().fetches.values().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Resources> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for MemoryFetcher {
    fn resolve(&self, path: &str) -> String {
        format!("memory:///{}", path.trim_start_matches('/'))
    }

    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let mut resources = self.lock();
        *resources.fetches.entry(path.to_string()).or_default() += 1;
        resources
            .texts
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
