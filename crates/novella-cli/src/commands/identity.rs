use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::render_viewer;

pub(crate) async fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let viewer = ctx.core.identity.current().await;
    render_viewer(&viewer, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{context_for, mock_viewer};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn whoami_fetches_profile_once() {
        let server = MockServer::start_async().await;
        let profile = mock_viewer(&server, 3, 2);
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        handle_whoami(&ctx, OutputFormat::Json)
            .await
            .expect("whoami should succeed");
        handle_whoami(&ctx, OutputFormat::Table)
            .await
            .expect("whoami should succeed");

        let viewer = ctx.core.identity.cached().expect("viewer memoized");
        assert!(viewer.is_admin());
        profile.assert_calls(1);
    }

    #[tokio::test]
    async fn whoami_reports_anonymous_on_401() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/identity/profile");
            then.status(401);
        });
        let drafts = tempfile::tempdir().expect("tempdir");
        let ctx = context_for(&server, drafts.path());

        handle_whoami(&ctx, OutputFormat::Table)
            .await
            .expect("anonymous is not an error");
        assert!(!ctx.core.identity.current().await.is_authenticated());
    }
}
