//! Extension resource fetching with a session text cache.
//!
//! ### Resource layout
//! - `pages/<name>/index.html` (+ `<script>.js`)
//! - `includes/<name>/index.html` (+ scripts)
//! - `templates/<path>/index.html` (+ scripts)
//!
//! ### Cache semantics
//! - Keyed by the exact path string
//! - Entries never expire: fragments are static build assets
//! - Concurrent misses for one path each issue their own fetch

pub mod dir;
pub mod http;
pub mod memory;

use std::sync::Arc;

pub use dir::DirFetcher;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use splice_core::KvStore;

/// Errors from resource fetching.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Path escapes the extension root or is otherwise unusable.
    #[error("invalid resource path: {0}")]
    InvalidPath(String),

    /// No resource exists at the path.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Remote resource answered with a non-2xx status.
    #[error("status {status} fetching {path}")]
    HttpStatus { path: String, status: u16 },

    /// Network failure.
    #[error("network error fetching {path}: {reason}")]
    Network { path: String, reason: String },

    /// Filesystem failure.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Session store failure.
    #[error(transparent)]
    Store(#[from] splice_core::Error),
}

/// Host primitive for reading extension resources.
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Resolve a root-relative path to the address the host serves it from.
    fn resolve(&self, path: &str) -> String;

    /// Read the text content of a root-relative path.
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;
}

/// Resource fetcher that stores every fetched text in a session store.
#[derive(Clone)]
pub struct CachedFetcher {
    fetcher: Arc<dyn ResourceFetcher>,
    store: Arc<dyn KvStore>,
}

impl CachedFetcher {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, store: Arc<dyn KvStore>) -> Self {
        Self { fetcher, store }
    }

    /// Return the cached text for `path`, fetching and caching it on a miss.
    ///
    /// Hits are returned without any freshness check.
    pub async fn fetch_with_cache(&self, path: &str) -> Result<String, FetchError> {
        if let Some(text) = self.store.get(path).await? {
            tracing::debug!(path, "fragment cache hit");
            return Ok(text);
        }

        tracing::debug!(path, "fragment cache miss");
        let text = self.fetcher.fetch_text(path).await?;
        self.store.set(path, &text).await?;
        Ok(text)
    }

    pub fn resolve(&self, path: &str) -> String {
        self.fetcher.resolve(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::MemoryStore;

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let source = Arc::new(MemoryFetcher::new().with("pages/home/index.html", "<h1>Home</h1>"));
        let cached = CachedFetcher::new(source.clone(), Arc::new(MemoryStore::new()));

        let first = cached.fetch_with_cache("pages/home/index.html").await.unwrap();
        let second = cached.fetch_with_cache("pages/home/index.html").await.unwrap();

        assert_eq!(first, "<h1>Home</h1>");
        assert_eq!(first, second);
        assert_eq!(source.fetch_count("pages/home/index.html"), 1);
    }

    #[tokio::test]
    async fn test_hit_ignores_source_changes() {
        let source = Arc::new(MemoryFetcher::new().with("a.html", "v1"));
        let cached = CachedFetcher::new(source.clone(), Arc::new(MemoryStore::new()));

        cached.fetch_with_cache("a.html").await.unwrap();
        source.insert("a.html", "v2");

        assert_eq!(cached.fetch_with_cache("a.html").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_miss_error_is_not_cached() {
        let source = Arc::new(MemoryFetcher::new());
        let store = Arc::new(MemoryStore::new());
        let cached = CachedFetcher::new(source.clone(), store.clone());

        let result = cached.fetch_with_cache("pages/missing/index.html").await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_exact_path() {
        let source = Arc::new(MemoryFetcher::new().with("a.html", "a").with("./a.html", "dot-a"));
        let cached = CachedFetcher::new(source.clone(), Arc::new(MemoryStore::new()));

        assert_eq!(cached.fetch_with_cache("a.html").await.unwrap(), "a");
        assert_eq!(cached.fetch_with_cache("./a.html").await.unwrap(), "dot-a");
        assert_eq!(source.total_fetches(), 2);
    }
}
