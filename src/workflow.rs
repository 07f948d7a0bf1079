//! Command implementations behind the CLI.
//!
//! Each command resolves config, wires a store and gateway, and hands off
//! to the controller or status layer. Nothing here knows flow rules.

use crate::cli::{InitArgs, ResetArgs, RunArgs, StatusArgs, SyncArgs};
use crate::config;
use crate::controller::FlowController;
use crate::record::KEY_LEAD_ID;
use crate::status;
use crate::store::{FileStore, MemoryStore, SessionStore};
use crate::sync::{HttpGateway, LeadGateway, LoopbackGateway};
use crate::wizard;
use anyhow::{anyhow, Context, Result};

pub fn run_init(args: InitArgs) -> Result<()> {
    let path = args.config.unwrap_or_else(config::default_config_path);
    if path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    let mut cfg = config::default_config();
    if let Some(endpoint) = args.endpoint {
        cfg.endpoint = endpoint;
    }
    if let Some(whatsapp) = args.whatsapp {
        cfg.whatsapp_number = whatsapp;
    }
    if let Some(brand) = args.brand {
        cfg.brand = brand;
    }
    config::validate_config(&cfg)?;
    config::write_config(&path, &cfg)?;
    println!("wrote {}", path.display());
    println!("next: leadwiz run");
    Ok(())
}

pub fn run_wizard(args: RunArgs) -> Result<()> {
    let cfg = config::resolve_config(args.config.as_deref())?;
    let plan = config::resolve_plan(&cfg)?;
    let handoff = config::handoff_params(&cfg);

    let store: Box<dyn SessionStore> = if args.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let root = config::session_root(&cfg, args.session_dir.as_deref());
        Box::new(FileStore::new(root))
    };
    let gateway: Box<dyn LeadGateway> = if args.offline {
        Box::new(LoopbackGateway::new())
    } else {
        Box::new(HttpGateway::new(cfg.endpoint.clone()))
    };
    tracing::debug!(
        offline = args.offline,
        ephemeral = args.ephemeral,
        endpoint = %cfg.endpoint,
        "session configured"
    );

    let controller = FlowController::restore(plan, handoff, store, gateway)?;
    wizard::run_session(controller)
}

pub fn run_status(args: StatusArgs) -> Result<()> {
    let cfg = config::resolve_config(args.config.as_deref())?;
    let plan = config::resolve_plan(&cfg)?;
    let store = FileStore::new(config::session_root(&cfg, args.session_dir.as_deref()));
    let summary = status::build_summary(&plan, &store);
    if args.json {
        let text =
            serde_json::to_string_pretty(&summary).context("serialize session summary")?;
        println!("{text}");
    } else {
        status::print_summary(&summary);
    }
    Ok(())
}

/// One-shot resubmission of whatever the session holds, for leads captured
/// while the endpoint was unreachable.
pub fn run_sync(args: SyncArgs) -> Result<()> {
    let cfg = config::resolve_config(args.config.as_deref())?;
    let mut store = FileStore::new(config::session_root(&cfg, args.session_dir.as_deref()));
    let mut record = store.load_record();
    if record.is_empty() {
        return Err(anyhow!("no stored session; run `leadwiz run` first"));
    }
    let mut gateway = HttpGateway::new(cfg.endpoint.clone());
    let ack = gateway.submit(&record).context("lead submission failed")?;
    if let Some(lead_id) = ack.lead_id.or_else(|| record.lead_id().map(str::to_owned)) {
        record.set_text(KEY_LEAD_ID, lead_id);
    }
    store.save_record(&record);
    match record.lead_id() {
        Some(id) => println!("lead {id} synced"),
        None => println!("lead synced"),
    }
    Ok(())
}

pub fn run_reset(args: ResetArgs) -> Result<()> {
    let cfg = config::resolve_config(args.config.as_deref())?;
    let mut store = FileStore::new(config::session_root(&cfg, args.session_dir.as_deref()));
    store.clear();
    println!("session cleared at {}", store.paths().root().display());
    Ok(())
}
