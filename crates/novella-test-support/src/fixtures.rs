//! Identity, report, and storage fixtures.

use chrono::{TimeZone, Utc};
use novella_api_models::{EntityId, IdentityProfile, Report, ReportKind, Role};
use novella_core::{DraftStorage, StorageError};

/// Signed-in reader.
#[must_use]
pub fn reader(id: EntityId) -> IdentityProfile {
    profile(id, Role::Reader)
}

/// Signed-in administrator.
#[must_use]
pub fn admin(id: EntityId) -> IdentityProfile {
    profile(id, Role::Admin)
}

/// Signed-in viewer with the given role.
#[must_use]
pub fn profile(id: EntityId, role: Role) -> IdentityProfile {
    IdentityProfile {
        id,
        display_name: format!("user-{id}"),
        role,
    }
}

/// Unviewed report against `target_id`, filed in report-id order.
#[must_use]
pub fn report(report_id: EntityId, kind: ReportKind, target_id: EntityId) -> Report {
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
        + chrono::Duration::minutes(report_id);
    Report {
        report_id,
        target_kind: kind,
        target_id,
        reporter_id: 100 + report_id,
        reported_id: 200 + target_id,
        reason: "spam".to_string(),
        description: format!("report {report_id}"),
        created_at,
        viewed: false,
    }
}

/// Draft storage that rejects every operation, like a disabled `sessionStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDraftStorage;

impl DraftStorage for UnavailableDraftStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(unavailable())
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteRejected {
            key: key.to_string(),
            detail: "quota exceeded".to_string(),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(unavailable())
    }
}

fn unavailable() -> StorageError {
    StorageError::Unavailable {
        detail: "storage disabled".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_are_ordered_by_id() {
        let first = report(1, ReportKind::Novel, 10);
        let second = report(2, ReportKind::Novel, 11);
        assert!(first.created_at < second.created_at);
        assert!(!first.viewed);
    }

    #[test]
    fn admin_fixture_has_admin_role() {
        assert!(admin(1).role.is_admin());
        assert!(!reader(2).role.is_admin());
    }
}
