//! Request helper error types.

/// Errors from the request helper.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Base URL or endpoint does not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Non-2xx response.
    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body is not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response cache failure.
    #[error("cache error: {0}")]
    Store(#[from] splice_core::Error),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Network(err.to_string())
    }
}

impl RequestError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RequestError::HttpStatus { status: 503 };
        assert!(err.to_string().contains("503"));
        assert_eq!(err.status(), Some(503));

        let err = RequestError::Network("connection refused".to_string());
        assert!(err.to_string().contains("network error"));
        assert_eq!(err.status(), None);
    }
}
