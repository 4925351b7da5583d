//! Resource fetcher over an unpacked extension directory.

use super::{FetchError, ResourceFetcher};
use std::path::{Component, Path, PathBuf};

/// Reads resources relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, rejecting absolute paths and `..` segments.
    fn locate(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for DirFetcher {
    fn resolve(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }

    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let full = self.locate(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => {
                tracing::debug!(path, bytes = text.len(), "read resource");
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound(path.to_string())),
            Err(source) => Err(FetchError::Io { path: path.to_string(), source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pages/home")).unwrap();
        std::fs::write(dir.path().join("pages/home/index.html"), "<h1>Home</h1>").unwrap();

        let fetcher = DirFetcher::new(dir.path());
        let text = fetcher.fetch_text("pages/home/index.html").await.unwrap();
        assert_eq!(text, "<h1>Home</h1>");
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DirFetcher::new(dir.path());
        let result = fetcher.fetch_text("pages/nope/index.html").await;
        assert!(matches!(result, Err(FetchError::NotFound(p)) if p == "pages/nope/index.html"));
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DirFetcher::new(dir.path());
        assert!(matches!(fetcher.fetch_text("../secret").await, Err(FetchError::InvalidPath(_))));
        assert!(matches!(fetcher.fetch_text("/etc/passwd").await, Err(FetchError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_joins_root() {
        let fetcher = DirFetcher::new("/ext");
        assert_eq!(fetcher.resolve("pages/home/main.js"), "/ext/pages/home/main.js");
    }
}
