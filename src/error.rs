use thiserror::Error;

/// Detailed error types for client operations.
#[derive(Debug, Error)]
pub enum NylasError {
    /// Caller-supplied parameters failed validation before any request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network-level failure (connection refused, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not decode into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Context(String),
}

impl NylasError {
    /// Create an API error from a status code and raw body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error was raised before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error represents a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, NylasError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn with_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<NylasError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_err = e.into();
            NylasError::Context(format!("{}: {}", context.into(), base_err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = NylasError::api(404, "not found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_error_has_no_status() {
        let err = NylasError::Validation("missing field `id`".into());
        assert_eq!(err.status(), None);
        assert!(err.is_validation());
    }

    #[test]
    fn with_context_wraps_message() {
        let result: std::result::Result<(), serde_json::Error> =
            serde_json::from_str::<()>("{").map(|_| ());
        let err = result.with_context("decoding account").unwrap_err();
        assert!(err.to_string().starts_with("decoding account:"));
    }
}
