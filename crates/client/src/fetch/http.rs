//! Resource fetcher over a served extension root.

use super::{FetchError, ResourceFetcher};
use reqwest::Client;
use url::Url;

/// Fetches resources relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    base: Url,
}

impl HttpFetcher {
    /// Create a fetcher rooted at `base`. A trailing slash is added when
    /// missing so relative paths resolve beneath it.
    pub fn new(base: &str, user_agent: &str) -> Result<Self, FetchError> {
        let normalized = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        let base = Url::parse(&normalized).map_err(|e| FetchError::InvalidPath(format!("{base}: {e}")))?;

        let http = Client::builder()
            .user_agent(user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Network { path: base.to_string(), reason: e.to_string() })?;

        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidPath(format!("{path}: {e}")))
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for HttpFetcher {
    fn resolve(&self, path: &str) -> String {
        self.url_for(path)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.base, path.trim_start_matches('/')))
    }

    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network { path: path.to_string(), reason: e.to_string() })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus { path: path.to_string(), status: status.as_u16() });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network { path: path.to_string(), reason: e.to_string() })?;

        tracing::debug!("fetched {} ({} bytes)", url, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_gets_trailing_slash() {
        let fetcher = HttpFetcher::new("https://ext.example/app", "splice/0.1").unwrap();
        assert_eq!(fetcher.base().as_str(), "https://ext.example/app/");
    }

    #[test]
    fn test_resolve_relative_to_base() {
        let fetcher = HttpFetcher::new("https://ext.example/app/", "splice/0.1").unwrap();
        assert_eq!(fetcher.resolve("pages/home/main.js"), "https://ext.example/app/pages/home/main.js");
        assert_eq!(fetcher.resolve("/includes/nav/index.html"), "https://ext.example/app/includes/nav/index.html");
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(HttpFetcher::new("not a url", "splice/0.1"), Err(FetchError::InvalidPath(_))));
    }
}
