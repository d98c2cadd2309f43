#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Novella reader and moderation API.
//!
//! These types describe the contract between the client-side consistency layer
//! and the backend: identity profiles, engagement status, moderation reports,
//! and ban toggles. The HTTP transport and the scripted test backend both encode
//! and decode through them so the wire shape stays a single source of truth.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for users, novels, episodes, comments, and reports.
pub type EntityId = i64;

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    #[serde(default)]
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
}

/// Plain `{ "message": ... }` error body used by most backend routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBody {
    /// Human-readable message.
    pub message: String,
}

/// Viewer role as understood by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case", from = "RoleCode")]
pub enum Role {
    /// Regular reader or author.
    Reader,
    /// Author support staff; no moderation authority.
    AuthorSupport,
    /// Administrator; the only role allowed to moderate.
    Admin,
}

impl Role {
    /// Whether the role may execute moderation actions.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::AuthorSupport => "author-support",
            Self::Admin => "admin",
        }
    }

    /// Map a numeric role code onto a role. Unknown codes are readers.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::AuthorSupport,
            2 => Self::Admin,
            _ => Self::Reader,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Raw role payload; the backend emits either numeric codes or labels.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RoleCode {
    Numeric(u8),
    Named(String),
}

impl From<RoleCode> for Role {
    fn from(value: RoleCode) -> Self {
        match value {
            RoleCode::Numeric(code) => Self::from_code(code),
            RoleCode::Named(name) => match name.trim().to_ascii_lowercase().as_str() {
                "admin" => Self::Admin,
                "author-support" | "author_support" => Self::AuthorSupport,
                _ => Self::Reader,
            },
        }
    }
}

/// Response body of `GET /identity/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    /// Stable user id.
    pub id: EntityId,
    /// Mutable display name; never used for identity comparisons.
    pub display_name: String,
    /// Role granted to the viewer.
    pub role: Role,
}

/// Kind of viewer-to-entity engagement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    /// Bookmark on a novel.
    Bookmark,
    /// Like on an episode.
    Like,
}

impl EngagementKind {
    /// Path segment used by the engagement routes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::Like => "like",
        }
    }
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Response body of the engagement status check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementStatus {
    /// Whether the relation exists for the current viewer.
    pub present: bool,
}

/// Entity a report points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Reported novel.
    Novel,
    /// Reported comment.
    Comment,
    /// Reported user.
    User,
}

impl ReportKind {
    /// Query value used by the report routes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novel => "novel",
            Self::Comment => "comment",
            Self::User => "user",
        }
    }

    /// Every report kind, in console order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Novel, Self::Comment, Self::User]
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Moderation report as returned by `GET /reports/unviewed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report identifier.
    pub report_id: EntityId,
    /// Kind of the reported entity.
    pub target_kind: ReportKind,
    /// Identifier of the reported entity.
    pub target_id: EntityId,
    /// User who filed the report.
    pub reporter_id: EntityId,
    /// User responsible for the reported entity.
    pub reported_id: EntityId,
    /// Short reason code or label.
    pub reason: String,
    /// Free-form description from the reporter.
    #[serde(default)]
    pub description: String,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
    /// Whether an admin has reviewed the report.
    #[serde(default)]
    pub viewed: bool,
}

/// Response body of `PATCH /reports/{id}/view`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportViewed {
    /// Review flag after the update.
    pub viewed: bool,
}

/// Entity kinds that can be banned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A novel.
    Novel,
    /// A user account.
    User,
}

impl TargetKind {
    /// Query value used by the ban route.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novel => "novel",
            Self::User => "user",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Entity addressed by a ban toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModerationTarget {
    /// Entity kind.
    pub kind: TargetKind,
    /// Entity identifier.
    pub id: EntityId,
}

impl ModerationTarget {
    /// Target a novel.
    #[must_use]
    pub const fn novel(id: EntityId) -> Self {
        Self {
            kind: TargetKind::Novel,
            id,
        }
    }

    /// Target a user account.
    #[must_use]
    pub const fn user(id: EntityId) -> Self {
        Self {
            kind: TargetKind::User,
            id,
        }
    }
}

/// Response body of `PATCH /targets/{id}/ban`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BanToggleResponse {
    /// Ban flag after the toggle, as decided by the server.
    pub banned: bool,
    /// Status text surfaced verbatim to the admin.
    pub message: String,
}
