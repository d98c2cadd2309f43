//! User-facing notices and navigation outcomes.
//!
//! # Design
//! - Keep messages as plain data; rendering (toasts, banners) belongs to the view layer.
//! - Navigation is a value the page acts on, never a side effect of the core.

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational message.
    Info,
    /// Non-blocking warning (for example, drafts not persisting).
    Warning,
    /// Operation failed.
    Error,
}

/// Message to surface to the viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity of the message.
    pub level: NoticeLevel,
    /// Text shown to the viewer.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Route the page must navigate to instead of rendering data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Sign-in page.
    Login,
    /// Non-admin landing page.
    Home,
}

impl Navigation {
    /// Path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
        }
    }
}
