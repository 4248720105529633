//! Error types for lifecycle operations

use thiserror::Error;

/// Main error type for lifecycle operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A resource was recorded with a scope outside the known set.
    ///
    /// Fatal: indicates a data-integrity problem, not a transient fault.
    #[error("invalid scope: {0:?}")]
    InvalidScope(String),

    /// The platform rejected a request
    #[error("platform error (status {status}): {message}")]
    Api {
        /// HTTP status returned by the platform
        status: u16,
        /// Platform-reported message
        message: String,
    },

    /// A referenced resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The ambient request context was cancelled or timed out.
    ///
    /// Never retried, regardless of message.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// Transport-level failure before an HTTP status was received
    #[error("transport error: {0}")]
    Transport(String),

    /// Payload (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a platform API error with the given status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not-found error naming the missing resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a cancellation error with the given message
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a transport error with the given message
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the error is a cancellation of the ambient request context
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::cancelled(e.to_string())
        } else {
            Error::transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: a resource recorded with an impossible scope fails loudly,
    /// carrying the offending value for diagnostics.
    #[test]
    fn story_invalid_scope_carries_offending_value() {
        let err = Error::InvalidScope("projcet".to_string());
        assert!(err.to_string().contains("invalid scope"));
        assert!(err.to_string().contains("projcet"));

        // Empty scope is just as impossible as a typo
        let err = Error::InvalidScope(String::new());
        assert!(err.to_string().contains("invalid scope"));
    }

    /// Story: platform errors keep the status and message visible so the
    /// operator sees the real cause, not a wrapper.
    #[test]
    fn story_api_errors_surface_platform_message() {
        let err = Error::api(423, "resource is locked by another operation");
        assert!(err.to_string().contains("423"));
        assert!(err.to_string().contains("resource is locked"));

        match Error::api(400, "bad request") {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad request");
            }
            _ => panic!("expected Api variant"),
        }
    }

    /// Story: cancellation is its own category so the retry loop can refuse
    /// to retry it no matter what the message says.
    #[test]
    fn story_cancellation_is_distinguishable() {
        let err = Error::cancelled("deadline exceeded");
        assert!(err.is_cancelled());

        // A cancellation whose text mentions a lock is still a cancellation
        let err = Error::cancelled("cancelled while resource is locked");
        assert!(err.is_cancelled());

        assert!(!Error::api(423, "resource is locked").is_cancelled());
        assert!(!Error::transport("connection reset").is_cancelled());
    }

    #[test]
    fn constructors_accept_string_and_str() {
        let name = "addon-profile";
        let err = Error::not_found(format!("profile '{}'", name));
        assert!(err.to_string().contains("addon-profile"));
        assert!(err.to_string().contains("not found"));

        let err = Error::config("NIMBUS_HOST is not set");
        assert!(err.to_string().contains("configuration error"));
    }
}
