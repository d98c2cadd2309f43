use novella_api_models::ReportKind;
use novella_core::{ReportListOutcome, ReviewOutcome};

use crate::cli::{OutputFormat, ReportViewArgs, ReportsListArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_reports;

pub(crate) async fn handle_reports_list(
    ctx: &AppContext,
    args: ReportsListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let kinds = args
        .kind
        .map_or_else(|| ReportKind::all().to_vec(), |kind| vec![kind.into()]);

    let mut reports = Vec::new();
    for kind in kinds {
        match ctx.core.moderation.list_unviewed_reports(kind).await {
            ReportListOutcome::Loaded(batch) => reports.extend(batch),
            ReportListOutcome::Redirect(navigation) => {
                return Err(CliError::from_navigation(navigation));
            }
            ReportListOutcome::Failed(notice) => return Err(CliError::from_notice(&notice)),
        }
    }
    render_reports(&reports, format)
}

pub(crate) async fn handle_report_view(ctx: &AppContext, args: ReportViewArgs) -> CliResult<()> {
    match ctx.core.moderation.mark_viewed(args.id).await {
        ReviewOutcome::Confirmed => {
            println!("Report {} marked as reviewed.", args.id);
            Ok(())
        }
        ReviewOutcome::Restored(notice) => Err(CliError::from_notice(&notice)),
        ReviewOutcome::Refused(notice) => Err(CliError::validation(notice.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportKindArg;
    use crate::client::test_support::{context_for, mock_viewer};
    use httpmock::prelude::*;
    use serde_json::json;

    fn report_json(id: i64, kind: &str) -> serde_json::Value {
        json!({
            "reportId": id,
            "targetKind": kind,
            "targetId": id * 10,
            "reporterId": 100,
            "reportedId": 200,
            "reason": "spam",
            "createdAt": "2026-05-01T08:30:00Z"
        })
    }

    #[tokio::test]
    async fn list_queries_every_kind_by_default() {
        let server = MockServer::start_async().await;
        mock_viewer(&server, 9, 2);
        let mocks: Vec<_> = ["novel", "comment", "user"]
            .into_iter()
            .enumerate()
            .map(|(index, kind)| {
                let id = i64::try_from(index).expect("small index") + 1;
                server.mock(move |when, then| {
                    when.method(GET)
                        .path("/reports/unviewed")
                        .query_param("kind", kind);
                    then.status(200).json_body(json!([report_json(id, kind)]));
                })
            })
            .collect();
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        handle_reports_list(&ctx, ReportsListArgs::default(), OutputFormat::Table)
            .await
            .expect("listing should succeed");

        for mock in &mocks {
            mock.assert();
        }
        assert_eq!(ctx.core.moderation.unviewed(ReportKind::User).len(), 1);
    }

    #[tokio::test]
    async fn non_admin_is_rejected_without_listing() {
        let server = MockServer::start_async().await;
        mock_viewer(&server, 4, 1);
        let listing = server.mock(|when, then| {
            when.method(GET).path("/reports/unviewed");
            then.status(200).json_body(json!([]));
        });
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        let err = handle_reports_list(
            &ctx,
            ReportsListArgs {
                kind: Some(ReportKindArg::Novel),
            },
            OutputFormat::Json,
        )
        .await
        .expect_err("non-admin must be rejected");

        assert!(matches!(err, CliError::Validation(message) if message.contains("administrator")));
        listing.assert_calls(0);
    }

    #[tokio::test]
    async fn view_marks_report() {
        let server = MockServer::start_async().await;
        mock_viewer(&server, 9, 2);
        let mock = server.mock(|when, then| {
            when.method(PATCH).path("/reports/31/view");
            then.status(200).json_body(json!({"viewed": true}));
        });
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        handle_report_view(&ctx, ReportViewArgs { id: 31 })
            .await
            .expect("view should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn unconfirmed_view_is_failure() {
        let server = MockServer::start_async().await;
        mock_viewer(&server, 9, 2);
        server.mock(|when, then| {
            when.method(PATCH).path("/reports/32/view");
            then.status(200).json_body(json!({"viewed": false}));
        });
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        let err = handle_report_view(&ctx, ReportViewArgs { id: 32 })
            .await
            .expect_err("viewed:false is a failure");
        assert_eq!(err.exit_code(), 3);
    }
}
