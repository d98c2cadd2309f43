use std::rc::Rc;

use novella_api_models::{ModerationTarget, ReportKind};
use novella_core::{
    BackendError, BanOutcome, CoreContext, Navigation, ReportListOutcome, ReviewOutcome, Viewer,
};
use novella_test_support::fixtures::{admin, reader, report};
use novella_test_support::mocks::{Op, ScriptedBackend};

fn desk_with(
    profile: novella_api_models::IdentityProfile,
) -> (Rc<ScriptedBackend>, CoreContext<ScriptedBackend>) {
    let backend = Rc::new(ScriptedBackend::with_viewer(profile));
    backend.seed_reports(vec![
        report(1, ReportKind::Novel, 10),
        report(2, ReportKind::Novel, 11),
        report(3, ReportKind::Novel, 12),
        report(4, ReportKind::Comment, 40),
    ]);
    let core = CoreContext::new(Rc::clone(&backend));
    (backend, core)
}

fn ids(core: &CoreContext<ScriptedBackend>, kind: ReportKind) -> Vec<i64> {
    core.moderation
        .unviewed(kind)
        .iter()
        .map(|report| report.report_id)
        .collect()
}

#[tokio::test]
async fn admin_loads_only_requested_kind() {
    let (backend, core) = desk_with(admin(9));

    let outcome = core.moderation.list_unviewed_reports(ReportKind::Novel).await;

    let ReportListOutcome::Loaded(reports) = outcome else {
        panic!("expected reports");
    };
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.target_kind == ReportKind::Novel));
    assert_eq!(ids(&core, ReportKind::Comment), Vec::<i64>::new());
    assert_eq!(backend.count(Op::UnviewedReports), 1);
}

#[tokio::test]
async fn forbidden_listing_redirects_home_without_data() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    backend.fail_next(
        Op::UnviewedReports,
        BackendError::status_with(403, "admin role required"),
    );

    let outcome = core.moderation.list_unviewed_reports(ReportKind::Novel).await;

    assert_eq!(outcome, ReportListOutcome::Redirect(Navigation::Home));
    assert!(core.moderation.unviewed(ReportKind::Novel).is_empty());
    assert_eq!(core.identity.cached().map(|v| v.is_admin()), Some(true));
}

#[tokio::test]
async fn unauthorized_listing_redirects_to_login_and_demotes() {
    let (backend, core) = desk_with(admin(9));
    backend.fail_next(Op::UnviewedReports, BackendError::status(401));

    let outcome = core.moderation.list_unviewed_reports(ReportKind::User).await;

    assert_eq!(outcome, ReportListOutcome::Redirect(Navigation::Login));
    assert_eq!(core.identity.cached(), Some(Viewer::Anonymous));
    assert_eq!(Navigation::Login.path(), "/login");
}

#[tokio::test]
async fn non_admin_is_sent_home_before_any_listing_call() {
    let (backend, core) = desk_with(reader(3));

    let outcome = core.moderation.list_unviewed_reports(ReportKind::Novel).await;

    assert_eq!(outcome, ReportListOutcome::Redirect(Navigation::Home));
    assert_eq!(backend.count(Op::UnviewedReports), 0);
}

#[tokio::test]
async fn anonymous_viewer_is_sent_to_login() {
    let backend = Rc::new(ScriptedBackend::new());
    let core = CoreContext::new(Rc::clone(&backend));

    let outcome = core.moderation.list_unviewed_reports(ReportKind::Comment).await;

    assert_eq!(outcome, ReportListOutcome::Redirect(Navigation::Login));
    assert_eq!(backend.count(Op::UnviewedReports), 0);
}

#[tokio::test]
async fn server_error_keeps_previous_queue() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    backend.fail_next(Op::UnviewedReports, BackendError::status(503));

    let outcome = core.moderation.list_unviewed_reports(ReportKind::Novel).await;

    assert!(matches!(outcome, ReportListOutcome::Failed(_)));
    assert_eq!(ids(&core, ReportKind::Novel), vec![1, 2, 3]);
}

#[tokio::test]
async fn confirmed_review_removes_report() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;

    let outcome = core.moderation.mark_viewed(2).await;

    assert_eq!(outcome, ReviewOutcome::Confirmed);
    assert_eq!(ids(&core, ReportKind::Novel), vec![1, 3]);
    assert_eq!(backend.report_viewed(2), Some(true));

    let reloaded = core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    let ReportListOutcome::Loaded(reports) = reloaded else {
        panic!("expected reports");
    };
    assert!(reports.iter().all(|r| r.report_id != 2));
}

#[tokio::test]
async fn reload_during_review_does_not_resurrect_confirmed_report() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    let gate = backend.hold(Op::MarkReportViewed);

    let (outcome, reloaded) = tokio::join!(core.moderation.mark_viewed(2), async {
        let reloaded = core.moderation.list_unviewed_reports(ReportKind::Novel).await;
        gate.release();
        reloaded
    });

    assert!(matches!(reloaded, ReportListOutcome::Loaded(ref reports) if reports.len() == 3));
    assert_eq!(outcome, ReviewOutcome::Confirmed);
    assert_eq!(ids(&core, ReportKind::Novel), vec![1, 3]);
    assert_eq!(backend.report_viewed(2), Some(true));
}

#[tokio::test]
async fn failed_review_restores_report_in_place() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    backend.fail_next(Op::MarkReportViewed, BackendError::status(500));
    let gate = backend.hold(Op::MarkReportViewed);

    let (outcome, ()) = tokio::join!(core.moderation.mark_viewed(2), async {
        assert_eq!(ids(&core, ReportKind::Novel), vec![1, 3]);
        gate.release();
    });

    assert!(matches!(outcome, ReviewOutcome::Restored(_)));
    assert_eq!(ids(&core, ReportKind::Novel), vec![1, 2, 3]);
    assert_eq!(backend.report_viewed(2), Some(false));
}

#[tokio::test]
async fn restored_report_keeps_order_across_interleaved_reviews() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    let gate = backend.hold(Op::MarkReportViewed);

    let (held, other) = tokio::join!(core.moderation.mark_viewed(2), async {
        let other = core.moderation.mark_viewed(1).await;
        assert_eq!(ids(&core, ReportKind::Novel), vec![3]);
        backend.fail_next(Op::MarkReportViewed, BackendError::status(500));
        gate.release();
        other
    });

    assert_eq!(other, ReviewOutcome::Confirmed);
    assert!(matches!(held, ReviewOutcome::Restored(_)));
    assert_eq!(ids(&core, ReportKind::Novel), vec![2, 3]);
}

#[tokio::test]
async fn missing_report_review_is_restored() {
    let (backend, core) = desk_with(admin(9));
    core.moderation.list_unviewed_reports(ReportKind::Novel).await;
    backend.fail_next(Op::MarkReportViewed, BackendError::status(404));

    let outcome = core.moderation.mark_viewed(3).await;

    let ReviewOutcome::Restored(notice) = outcome else {
        panic!("expected restore");
    };
    assert!(!notice.message.is_empty());
    assert_eq!(ids(&core, ReportKind::Novel), vec![1, 2, 3]);
}

#[tokio::test]
async fn non_admin_review_is_refused_without_network() {
    let (backend, core) = desk_with(reader(3));

    let outcome = core.moderation.mark_viewed(1).await;

    assert!(matches!(outcome, ReviewOutcome::Refused(_)));
    assert_eq!(backend.count(Op::MarkReportViewed), 0);
}

#[tokio::test]
async fn ban_toggle_reflects_server_values() {
    let (backend, core) = desk_with(admin(9));
    let target = ModerationTarget::user(55);

    let first = core.moderation.toggle_ban(target).await;
    let BanOutcome::Applied { banned, message } = first else {
        panic!("expected applied ban");
    };
    assert!(banned);
    assert!(message.contains("banned"));
    assert_eq!(core.moderation.ban_state(target), Some(true));

    let second = core.moderation.toggle_ban(target).await;
    assert!(matches!(second, BanOutcome::Applied { banned: false, .. }));
    assert_eq!(core.moderation.ban_state(target), Some(false));
    assert!(!backend.banned(target));
    assert_eq!(backend.count(Op::ToggleBan), 2);
}

#[tokio::test]
async fn ban_state_follows_server_even_when_local_record_disagrees() {
    let (backend, core) = desk_with(admin(9));
    let target = ModerationTarget::novel(7);
    backend.seed_ban(target, true);
    core.moderation.record_ban_state(target, false);

    let outcome = core.moderation.toggle_ban(target).await;

    assert!(matches!(outcome, BanOutcome::Applied { banned: false, .. }));
    assert_eq!(core.moderation.ban_state(target), Some(false));
}

#[tokio::test]
async fn failed_ban_leaves_state_and_is_not_retried() {
    let (backend, core) = desk_with(admin(9));
    let target = ModerationTarget::novel(7);
    core.moderation.record_ban_state(target, true);
    backend.fail_next(Op::ToggleBan, BackendError::status(403));

    let outcome = core.moderation.toggle_ban(target).await;

    assert!(matches!(outcome, BanOutcome::Failed(_)));
    assert_eq!(core.moderation.ban_state(target), Some(true));
    assert_eq!(backend.count(Op::ToggleBan), 1);
}

#[tokio::test]
async fn non_admin_ban_is_refused() {
    let (backend, core) = desk_with(reader(3));

    let outcome = core.moderation.toggle_ban(ModerationTarget::user(1)).await;

    assert!(matches!(outcome, BanOutcome::Refused(_)));
    assert_eq!(backend.count(Op::ToggleBan), 0);
}
