//! Provider error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Everything that can go wrong talking to a chat-completion API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection refused, DNS failure, timeout and friends.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The body could not be decoded into a completion.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A well-formed reply without any choices.
    #[error("model returned no answer")]
    EmptyResponse,

    #[error("{0}")]
    Internal(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Network(msg) if msg.contains("timed out"))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        let err = ProviderError::Api {
            status: 401,
            message: "Authentication Fails".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 401: Authentication Fails");
    }

    #[test]
    fn test_is_timeout() {
        assert!(ProviderError::Network("request timed out: deadline".into()).is_timeout());
        assert!(!ProviderError::Network("connection refused".into()).is_timeout());
        assert!(!ProviderError::EmptyResponse.is_timeout());
    }
}
