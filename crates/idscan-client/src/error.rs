//! Error types for backend calls.

use thiserror::Error;

/// Errors that can occur while talking to the recognition backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection refused, DNS, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success status without a structured message
    #[error("backend error: status {status}, {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        message: String,
    },

    /// 400 response carrying a machine-readable `{ "error": ... }` message
    #[error("backend rejected request: {message}")]
    Rejected {
        /// Message supplied by the backend, verbatim
        message: String,
    },

    /// Success-class status other than the one the operation requires
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be decoded
    #[error("failed to parse backend response: {message}")]
    ParseError {
        /// Error message
        message: String,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Message the backend attached to a rejected request, if any.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend error: status 503, Service Unavailable"
        );

        let err = ClientError::Rejected {
            message: "No text detected in image".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend rejected request: No text detected in image"
        );
    }

    #[test]
    fn test_rejection_message() {
        let err = ClientError::Rejected {
            message: "Invalid ID card".to_string(),
        };
        assert_eq!(err.rejection_message(), Some("Invalid ID card"));

        let err = ClientError::UnexpectedStatus { status: 204 };
        assert_eq!(err.rejection_message(), None);
    }
}
