use novella_api_models::EngagementKind;
use novella_core::{EngagementTarget, ToggleOutcome};

use crate::cli::{EngagementStatusArgs, EngagementToggleArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_presence;

pub(crate) async fn handle_engagement_status(
    ctx: &AppContext,
    kind: EngagementKind,
    args: EngagementStatusArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let presence = ctx.core.engagement.query_status(args.id, kind).await;
    render_presence(kind, args.id, presence, format)
}

pub(crate) async fn handle_engagement_toggle(
    ctx: &AppContext,
    kind: EngagementKind,
    args: EngagementToggleArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let target = EngagementTarget {
        id: args.id,
        author_id: args.author_id,
    };
    match ctx.core.engagement.toggle(target, kind).await {
        ToggleOutcome::Confirmed(presence) => render_presence(kind, args.id, presence, format),
        ToggleOutcome::Reverted { notice, .. } | ToggleOutcome::Unresolved(notice) => {
            Err(CliError::from_notice(&notice))
        }
        ToggleOutcome::Refused { notice, .. } => Err(CliError::validation(notice.message)),
        ToggleOutcome::Discarded => Err(CliError::validation(format!(
            "{kind} {} was closed before the change settled",
            args.id
        ))),
    }
}
