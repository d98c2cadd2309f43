//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use novella_api_models::{EngagementKind, EntityId, ModerationTarget, ReportKind, TargetKind};
use novella_client::ClientConfig;
use novella_telemetry::{LogFormat, LoggingConfig, init_logging};
use url::Url;

use crate::client::{AppContext, CliResult};
use crate::commands::bans::handle_ban;
use crate::commands::drafts::{handle_draft_discard, handle_draft_save, handle_draft_show};
use crate::commands::engagement::{handle_engagement_status, handle_engagement_toggle};
use crate::commands::identity::handle_whoami;
use crate::commands::reports::{handle_report_view, handle_reports_list};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and reports failures.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    let command = command_label(&cli.command);
    match dispatch(cli).await {
        Ok(()) => {
            tracing::debug!(command, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config = ClientConfig::new(cli.api_url)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_session_cookie(cli.session_cookie);
    let draft_dir = cli.draft_dir.unwrap_or_else(default_draft_dir);
    let ctx = AppContext::new(config, draft_dir)?;
    let format = cli.output;

    match cli.command {
        Command::Whoami => handle_whoami(&ctx, format).await,
        Command::Bookmark(command) => {
            dispatch_engagement(&ctx, EngagementKind::Bookmark, command, format).await
        }
        Command::Like(command) => {
            dispatch_engagement(&ctx, EngagementKind::Like, command, format).await
        }
        Command::Reports(command) => match command {
            ReportsCommand::List(args) => handle_reports_list(&ctx, args, format).await,
            ReportsCommand::View(args) => handle_report_view(&ctx, args).await,
        },
        Command::Ban(args) => handle_ban(&ctx, args, format).await,
        Command::Draft(command) => match command {
            DraftCommand::Save(args) => handle_draft_save(&ctx, args),
            DraftCommand::Show(args) => handle_draft_show(&ctx, args, format),
            DraftCommand::Discard(args) => handle_draft_discard(&ctx, args),
        },
    }
}

async fn dispatch_engagement(
    ctx: &AppContext,
    kind: EngagementKind,
    command: EngagementCommand,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        EngagementCommand::Status(args) => {
            handle_engagement_status(ctx, kind, args, format).await
        }
        EngagementCommand::Toggle(args) => {
            handle_engagement_toggle(ctx, kind, args, format).await
        }
    }
}

#[derive(Parser)]
#[command(
    name = "novella",
    about = "Engagement, moderation, and draft tooling for Novella"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "NOVELLA_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "NOVELLA_SESSION_COOKIE",
        hide_env_values = true,
        help = "Session cookie sent with every request, as name=value"
    )]
    session_cookie: Option<String>,
    #[arg(
        long,
        global = true,
        env = "NOVELLA_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "NOVELLA_DRAFT_DIR",
        help = "Directory holding local drafts (defaults to a temp directory)"
    )]
    draft_dir: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "NOVELLA_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "NOVELLA_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the signed-in viewer.
    Whoami,
    /// Novel bookmarks.
    #[command(subcommand)]
    Bookmark(EngagementCommand),
    /// Episode likes.
    #[command(subcommand)]
    Like(EngagementCommand),
    /// Report review queue.
    #[command(subcommand)]
    Reports(ReportsCommand),
    /// Toggle the ban flag of a novel or user.
    Ban(BanArgs),
    /// Local drafts.
    #[command(subcommand)]
    Draft(DraftCommand),
}

#[derive(Subcommand)]
pub(crate) enum EngagementCommand {
    /// Check whether the relation exists.
    Status(EngagementStatusArgs),
    /// Flip the relation.
    Toggle(EngagementToggleArgs),
}

#[derive(Subcommand)]
pub(crate) enum ReportsCommand {
    /// List unviewed reports.
    List(ReportsListArgs),
    /// Mark a report as reviewed.
    View(ReportViewArgs),
}

#[derive(Subcommand)]
pub(crate) enum DraftCommand {
    /// Save fields into the local draft.
    Save(DraftSaveArgs),
    /// Print the local draft.
    Show(DraftTargetArgs),
    /// Delete the local draft.
    Discard(DraftTargetArgs),
}

#[derive(Args)]
pub(crate) struct EngagementStatusArgs {
    #[arg(help = "Novel id for bookmarks, episode id for likes")]
    pub(crate) id: EntityId,
}

#[derive(Args)]
pub(crate) struct EngagementToggleArgs {
    #[arg(help = "Novel id for bookmarks, episode id for likes")]
    pub(crate) id: EntityId,
    #[arg(long = "author", help = "Author id of the target")]
    pub(crate) author_id: EntityId,
}

#[derive(Args, Default)]
pub(crate) struct ReportsListArgs {
    #[arg(long, value_enum, help = "Only list reports of this kind")]
    pub(crate) kind: Option<ReportKindArg>,
}

#[derive(Args)]
pub(crate) struct ReportViewArgs {
    #[arg(help = "Report identifier")]
    pub(crate) id: EntityId,
}

#[derive(Args)]
pub(crate) struct BanArgs {
    #[arg(value_enum)]
    pub(crate) kind: TargetKindArg,
    #[arg(help = "Novel or user identifier")]
    pub(crate) id: EntityId,
}

#[derive(Args, Default)]
pub(crate) struct DraftSaveArgs {
    #[arg(help = "Episode or novel the draft belongs to")]
    pub(crate) parent_id: EntityId,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) body: Option<String>,
    #[arg(
        long = "flag",
        value_parser = parse_flag,
        help = "Auxiliary toggle as name=true|false (repeatable)"
    )]
    pub(crate) flags: Vec<(String, bool)>,
}

#[derive(Args)]
pub(crate) struct DraftTargetArgs {
    #[arg(help = "Episode or novel the draft belongs to")]
    pub(crate) parent_id: EntityId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportKindArg {
    Novel,
    Comment,
    User,
}

impl From<ReportKindArg> for ReportKind {
    fn from(value: ReportKindArg) -> Self {
        match value {
            ReportKindArg::Novel => Self::Novel,
            ReportKindArg::Comment => Self::Comment,
            ReportKindArg::User => Self::User,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TargetKindArg {
    Novel,
    User,
}

impl BanArgs {
    pub(crate) const fn target(&self) -> ModerationTarget {
        let kind = match self.kind {
            TargetKindArg::Novel => TargetKind::Novel,
            TargetKindArg::User => TargetKind::User,
        };
        ModerationTarget { kind, id: self.id }
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Whoami => "whoami",
        Command::Bookmark(EngagementCommand::Status(_)) => "bookmark_status",
        Command::Bookmark(EngagementCommand::Toggle(_)) => "bookmark_toggle",
        Command::Like(EngagementCommand::Status(_)) => "like_status",
        Command::Like(EngagementCommand::Toggle(_)) => "like_toggle",
        Command::Reports(ReportsCommand::List(_)) => "reports_list",
        Command::Reports(ReportsCommand::View(_)) => "reports_view",
        Command::Ban(_) => "ban",
        Command::Draft(DraftCommand::Save(_)) => "draft_save",
        Command::Draft(DraftCommand::Show(_)) => "draft_show",
        Command::Draft(DraftCommand::Discard(_)) => "draft_discard",
    }
}

fn default_draft_dir() -> PathBuf {
    std::env::temp_dir().join("novella-drafts")
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input
        .parse::<LogFormat>()
        .map_err(|_| format!("unknown log format '{input}' (expected json or pretty)"))
}

fn parse_flag(input: &str) -> Result<(String, bool), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("flag '{input}' must be name=true|false"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("flag name cannot be empty".to_string());
    }
    let value = value
        .trim()
        .parse::<bool>()
        .map_err(|_| format!("flag '{name}' must be true or false"))?;
    Ok((name.to_string(), value))
}
