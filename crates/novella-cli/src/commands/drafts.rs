use anyhow::anyhow;
use novella_core::EditorSession;

use crate::cli::{DraftSaveArgs, DraftTargetArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_draft;

pub(crate) fn handle_draft_save(ctx: &AppContext, args: DraftSaveArgs) -> CliResult<()> {
    if args.title.is_none() && args.body.is_none() && args.flags.is_empty() {
        return Err(CliError::validation(
            "nothing to save (pass --title, --body, or --flag)",
        ));
    }

    let mut editor = EditorSession::open(&ctx.drafts, args.parent_id, None);
    let notice = editor.edit(|content| {
        if let Some(title) = args.title {
            content.title = title;
        }
        if let Some(body) = args.body {
            content.body = body;
        }
        content.aux_flags.extend(args.flags);
    });
    if let Some(notice) = notice {
        return Err(CliError::failure(anyhow!(
            "{} ({})",
            notice.message,
            ctx.drafts.storage().root().display()
        )));
    }

    println!("Draft for {} saved.", args.parent_id);
    Ok(())
}

pub(crate) fn handle_draft_show(
    ctx: &AppContext,
    args: DraftTargetArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let record = ctx
        .drafts
        .load(args.parent_id)
        .ok_or_else(|| CliError::validation(format!("no draft for {}", args.parent_id)))?;
    render_draft(&record, format)
}

pub(crate) fn handle_draft_discard(ctx: &AppContext, args: DraftTargetArgs) -> CliResult<()> {
    let mut editor = EditorSession::open(&ctx.drafts, args.parent_id, None);
    if !editor.recovered() {
        println!("No draft for {}.", args.parent_id);
        return Ok(());
    }
    editor.discard();
    println!("Draft for {} discarded.", args.parent_id);
    Ok(())
}
