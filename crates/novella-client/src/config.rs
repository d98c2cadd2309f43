//! Transport configuration.

use std::time::Duration;

use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`crate::HttpBackend`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the API routes are resolved against.
    pub base_url: Url,
    /// Per-request timeout; the only timeout the client applies.
    pub timeout: Duration,
    /// Session cookie (`name=value`) sent with every request.
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    /// Configuration with the default timeout and no session.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            session_cookie: None,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a session cookie; blank values are ignored.
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cookie_is_dropped() -> Result<(), url::ParseError> {
        let config = ClientConfig::new("http://localhost:8080".parse()?)
            .with_session_cookie(Some("   ".to_string()));
        assert!(config.session_cookie.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        let config = config
            .with_session_cookie(Some(" session=abc ".to_string()))
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        Ok(())
    }
}
