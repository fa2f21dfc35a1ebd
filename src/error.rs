//! Error types for the insight engine

use thiserror::Error;

/// Errors surfaced by ingestion and configuration
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("record {index}: {message}")]
    InputSchema { index: usize, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InsightError {
    pub fn schema(index: usize, message: impl Into<String>) -> Self {
        InsightError::InputSchema {
            index,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        InsightError::Config {
            message: message.into(),
        }
    }
}

/// Failures of a recommendation provider. Callers recover from all of
/// these the same way.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("provider http error: {0}")]
    Http(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Transport timeouts land in `Http`; `Timeout` is reserved for the
/// engine's own deadline, which knows its duration.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Http(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

pub type InsightResult<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_transport_timeout_maps_to_http() {
        // accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .no_proxy()
            .build()
            .unwrap();
        let err = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        match ProviderError::from(err) {
            ProviderError::Http(message) => assert!(message.starts_with("request timed out")),
            other => panic!("expected Http, got {:?}", other),
        }
        server.abort();
    }

    #[test]
    fn test_error_messages() {
        let err = InsightError::schema(3, "missing text");
        assert_eq!(err.to_string(), "record 3: missing text");
        let err = ProviderError::Timeout { timeout_ms: 1500 };
        assert_eq!(err.to_string(), "provider timed out after 1500ms");
    }
}
