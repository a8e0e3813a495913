use thiserror::Error;

/// Failure of a single backend round trip
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered and reported a logical error
    #[error("{0}")]
    Backend(String),

    /// The request never completed (connection refused, timeout, ...)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with something that is not the expected JSON
    #[error("unexpected response from {endpoint} (HTTP {status}): {source}")]
    Decode {
        endpoint: &'static str,
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// True when the backend itself produced the message
    pub fn is_backend(&self) -> bool {
        matches!(self, ApiError::Backend(_))
    }

    /// Text suitable for an inline error line
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_displays_message_verbatim() {
        let err = ApiError::Backend("Missing required fields".to_string());
        assert!(err.is_backend());
        assert_eq!(err.user_message(), "Missing required fields");
    }

    #[test]
    fn test_decode_error_mentions_endpoint_and_status() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = ApiError::Decode {
            endpoint: "/apply_solution",
            status: 502,
            source,
        };
        let msg = err.user_message();
        assert!(msg.contains("/apply_solution"));
        assert!(msg.contains("502"));
        assert!(!err.is_backend());
    }
}
