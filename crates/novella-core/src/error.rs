//! Error types for backend and draft storage failures.
//!
//! # Design
//!
//! - Provide structured, constant-message errors for backend and storage failures.
//! - Keep status codes and server detail as fields so callers can branch on them.
//! - Core operations convert these into outcomes; they rarely reach a page boundary.

use thiserror::Error;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Generic text used when the server gave no usable detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors produced by a [`Backend`](crate::backend::Backend) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The server answered with a non-success status.
    #[error("backend returned a failure status")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when the body carried one.
        detail: Option<String>,
    },
    /// The request never produced a response.
    #[error("backend transport failure")]
    Transport {
        /// Transport-level description.
        detail: String,
    },
    /// A success response could not be decoded.
    #[error("backend response could not be decoded")]
    Decode {
        /// Decoder description.
        detail: String,
    },
}

impl BackendError {
    /// Build a status failure without a body.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::Status {
            status,
            detail: None,
        }
    }

    /// Build a status failure carrying a server message.
    #[must_use]
    pub fn status_with(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: Some(detail.into()),
        }
    }

    /// Build a transport failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Build a decode failure.
    #[must_use]
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Decode {
            detail: detail.into(),
        }
    }

    /// HTTP status code, when the server answered.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// The session is missing or expired (401).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// The viewer lacks authority (403).
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Status { status: 403, .. })
    }

    /// Either authorization failure.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        self.is_unauthorized() || self.is_forbidden()
    }

    /// Text suitable for a user-facing notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::Status { status: 401, .. } => "Please sign in again.".to_string(),
            Self::Status { status: 403, .. } => {
                "You are not allowed to perform this action.".to_string()
            }
            Self::Status { .. } | Self::Transport { .. } | Self::Decode { .. } => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// Errors raised by draft storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store is disabled or missing (privacy mode, no session scope).
    #[error("draft storage unavailable")]
    Unavailable {
        /// Reason reported by the platform.
        detail: String,
    },
    /// The store rejected a write (quota exceeded, read-only medium).
    #[error("draft storage write rejected")]
    WriteRejected {
        /// Key that failed to persist.
        key: String,
        /// Reason reported by the platform.
        detail: String,
    },
    /// IO failure in a file-backed store.
    #[error("draft storage io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Key involved in the failure.
        key: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// A draft record could not be serialized.
    #[error("draft record serialization failed")]
    Serialize {
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_predicates_follow_status() {
        assert!(BackendError::status(401).is_unauthorized());
        assert!(BackendError::status(403).is_forbidden());
        assert!(BackendError::status(403).is_auth_failure());
        assert!(!BackendError::status(500).is_auth_failure());
        assert!(!BackendError::transport("reset").is_auth_failure());
        assert_eq!(BackendError::decode("eof").status_code(), None);
    }

    #[test]
    fn user_message_prefers_server_detail() {
        assert_eq!(
            BackendError::status_with(409, "already bookmarked").user_message(),
            "already bookmarked"
        );
        assert_eq!(
            BackendError::status_with(500, "  ").user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            BackendError::status(401).user_message(),
            "Please sign in again."
        );
    }
}
