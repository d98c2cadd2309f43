//! Errors raised while building the HTTP backend.

use thiserror::Error;

/// Failures constructing an [`crate::HttpBackend`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL cannot carry relative API paths.
    #[error("base URL cannot be used for API requests")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
    /// A default header value contained invalid characters.
    #[error("request header contains invalid characters")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}
