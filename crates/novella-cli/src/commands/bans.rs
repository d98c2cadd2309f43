use novella_core::BanOutcome;

use crate::cli::{BanArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_ban;

pub(crate) async fn handle_ban(
    ctx: &AppContext,
    args: BanArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let target = args.target();
    match ctx.core.moderation.toggle_ban(target).await {
        BanOutcome::Applied { banned, message } => render_ban(target, banned, &message, format),
        BanOutcome::Failed(notice) => Err(CliError::from_notice(&notice)),
        BanOutcome::Refused(notice) => Err(CliError::validation(notice.message)),
    }
}
