//! Application context and error types shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::anyhow;
use novella_client::{ClientConfig, HttpBackend};
use novella_core::drafts::DirectoryDraftStorage;
use novella_core::{CoreContext, DraftStore, Navigation, Notice};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Failure carrying a user-facing notice from the core.
    pub(crate) fn from_notice(notice: &Notice) -> Self {
        Self::failure(anyhow!("{}", notice.message))
    }

    /// Redirect produced by an authorization gate.
    pub(crate) fn from_navigation(navigation: Navigation) -> Self {
        match navigation {
            Navigation::Login => Self::validation(
                "not signed in (pass --session-cookie or set NOVELLA_SESSION_COOKIE)",
            ),
            Navigation::Home => Self::validation("administrator role required"),
        }
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) core: CoreContext<HttpBackend>,
    pub(crate) drafts: DraftStore<DirectoryDraftStorage>,
}

impl AppContext {
    pub(crate) fn new(config: ClientConfig, draft_dir: PathBuf) -> CliResult<Self> {
        let backend = HttpBackend::new(config)
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP backend: {err}")))?;
        Ok(Self {
            core: CoreContext::new(Rc::new(backend)),
            drafts: DraftStore::new(DirectoryDraftStorage::new(draft_dir)),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use httpmock::prelude::*;
    use httpmock::{Mock, MockServer};
    use serde_json::json;

    use super::*;

    pub(crate) const SESSION_COOKIE: &str = "sid=test-session";

    pub(crate) fn context_for(server: &MockServer, draft_dir: &Path) -> AppContext {
        let base_url = server.base_url().parse().expect("mock server URL");
        let config =
            ClientConfig::new(base_url).with_session_cookie(Some(SESSION_COOKIE.to_string()));
        AppContext::new(config, draft_dir.to_path_buf()).expect("context")
    }

    pub(crate) fn mock_viewer(server: &MockServer, id: i64, role: u8) -> Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/identity/profile")
                .header("cookie", SESSION_COOKIE);
            then.status(200)
                .json_body(json!({"id": id, "displayName": format!("user-{id}"), "role": role}));
        })
    }
}
