//! CLI argument parsing for the lead wizard.
//!
//! The CLI is intentionally thin: every command routes into the workflow
//! layer, so the flow controller stays reusable behind other frontends.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the wizard.
///
/// Keeping a single `RootArgs` type makes command routing obvious and avoids
/// hidden defaults in subcommand constructors.
#[derive(Parser, Debug)]
#[command(
    name = "leadwiz",
    version,
    about = "Lead-capture wizard for franchise enquiry funnels",
    after_help = "Commands:\n  init      Write a starter deployment config\n  run       Walk the enquiry wizard in the terminal\n  status    Summarize the stored session\n  sync      Resubmit the stored lead to the save endpoint\n  reset     Clear the stored session\n\nExamples:\n  leadwiz init --endpoint https://example.com/api/save_lead.php --whatsapp 919900112233\n  leadwiz run\n  leadwiz run --offline --ephemeral\n  leadwiz status --json\n  leadwiz sync\n  leadwiz reset",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level wizard commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Run(RunArgs),
    Status(StatusArgs),
    Sync(SyncArgs),
    Reset(ResetArgs),
}

/// Init command inputs for writing a starter config.
#[derive(Parser, Debug)]
#[command(about = "Write a starter deployment config")]
pub struct InitArgs {
    /// Config path (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save endpoint that receives lead submissions
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// WhatsApp number for the handoff link, digits only with country code
    #[arg(long, value_name = "NUMBER")]
    pub whatsapp: Option<String>,

    /// Brand name used in copy and the handoff message
    #[arg(long, value_name = "NAME")]
    pub brand: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Run command inputs for an interactive session.
#[derive(Parser, Debug)]
#[command(about = "Walk the enquiry wizard in the terminal")]
pub struct RunArgs {
    /// Config path (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session directory holding lead.json and the step marker
    #[arg(long, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,

    /// Acknowledge submissions locally instead of calling the endpoint
    #[arg(long)]
    pub offline: bool,

    /// Keep session state in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

/// Status command inputs for a stored session.
#[derive(Parser, Debug)]
#[command(about = "Summarize the stored session")]
pub struct StatusArgs {
    /// Config path (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session directory holding lead.json and the step marker
    #[arg(long, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Sync command inputs for a one-shot resubmission.
#[derive(Parser, Debug)]
#[command(about = "Resubmit the stored lead to the save endpoint")]
pub struct SyncArgs {
    /// Config path (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session directory holding lead.json and the step marker
    #[arg(long, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,
}

/// Reset command inputs for clearing a stored session.
#[derive(Parser, Debug)]
#[command(about = "Clear the stored session")]
pub struct ResetArgs {
    /// Config path (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session directory holding lead.json and the step marker
    #[arg(long, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,
}
