use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lead_wizard::cli::{Command, RootArgs};
use lead_wizard::workflow;

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();
    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::Run(args) => workflow::run_wizard(args),
        Command::Status(args) => workflow::run_status(args),
        Command::Sync(args) => workflow::run_sync(args),
        Command::Reset(args) => workflow::run_reset(args),
    }
}

// Diagnostics go to stderr so prompts and summaries own stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lead_wizard=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
