//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use novella_api_models::{EngagementKind, EntityId, ModerationTarget, Report};
use novella_core::{DraftRecord, Presence, Viewer};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_viewer(viewer: &Viewer, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let value = viewer.identity().map_or_else(
                || json!({"authenticated": false}),
                |identity| {
                    json!({
                        "authenticated": true,
                        "id": identity.id,
                        "displayName": identity.display_name,
                        "role": identity.role,
                    })
                },
            );
            print_json(&value)?;
        }
        OutputFormat::Table => match viewer.identity() {
            Some(identity) => {
                println!("id: {}", identity.id);
                println!("name: {}", identity.display_name);
                println!("role: {}", identity.role);
            }
            None => println!("anonymous"),
        },
    }
    Ok(())
}

pub(crate) fn render_presence(
    kind: EngagementKind,
    target_id: EntityId,
    presence: Presence,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "kind": kind,
            "targetId": target_id,
            "present": presence.is_present(),
        }))?,
        OutputFormat::Table => {
            println!("{kind} {target_id}: {}", presence_label(presence));
        }
    }
    Ok(())
}

pub(crate) fn render_reports(reports: &[Report], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(reports)?,
        OutputFormat::Table => {
            println!(
                "{:>8} {:<8} {:>10} {:>10} {:<20} REASON",
                "ID", "KIND", "TARGET", "REPORTER", "FILED"
            );
            for report in reports {
                println!(
                    "{:>8} {:<8} {:>10} {:>10} {:<20} {}",
                    report.report_id,
                    report.target_kind,
                    report.target_id,
                    report.reporter_id,
                    report.created_at.format("%Y-%m-%d %H:%M"),
                    report.reason
                );
            }
            if reports.is_empty() {
                println!("no unviewed reports");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_ban(
    target: ModerationTarget,
    banned: bool,
    message: &str,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "kind": target.kind,
            "id": target.id,
            "banned": banned,
            "message": message,
        }))?,
        OutputFormat::Table => {
            println!("{message}");
            println!("banned: {banned}");
        }
    }
    Ok(())
}

pub(crate) fn render_draft(record: &DraftRecord, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(record)?,
        OutputFormat::Table => {
            println!("parent: {}", record.parent_id);
            println!("saved: {}", record.saved_at);
            println!("title: {}", record.content.title);
            for (name, enabled) in &record.content.aux_flags {
                println!("flag {name}: {enabled}");
            }
            println!();
            println!("{}", record.content.body);
        }
    }
    Ok(())
}

pub(crate) const fn presence_label(presence: Presence) -> &'static str {
    match presence {
        Presence::Present => "on",
        Presence::Absent => "off",
    }
}
