//! Deployment configuration helpers.
//!
//! The config names the save endpoint and handoff targets for one brand
//! deployment. Everything about the flow itself lives in the step table,
//! so pointing `flow_plan` at a JSON file swaps the funnel without a
//! rebuild.

use crate::controller::HandoffParams;
use crate::flow::FlowPlan;
use crate::store::FileStore;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// One brand deployment of the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    pub schema_version: u32,
    pub brand: String,
    pub endpoint: String,
    /// Digits only, country code included; goes straight into a wa.me link.
    pub whatsapp_number: String,
    pub brochure_source: PathBuf,
    pub brochure_filename: String,
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    #[serde(default)]
    pub flow_plan: Option<PathBuf>,
}

/// Build the default config used when no file exists yet.
pub fn default_config() -> WizardConfig {
    WizardConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        brand: "Cake Stories".to_string(),
        endpoint: "https://adclubmadras.ayatiworks.com/api/save_lead.php".to_string(),
        whatsapp_number: "919962522374".to_string(),
        brochure_source: PathBuf::from("files/CS-BROCHURE-FINAL.pdf"),
        brochure_filename: "Cake-Stories-Franchise-Brochure.pdf".to_string(),
        session_dir: None,
        flow_plan: None,
    }
}

/// Render a pretty JSON config stub for `init` and edit suggestions.
pub fn config_stub() -> String {
    let config = default_config();
    serde_json::to_string_pretty(&config).expect("serialize config stub")
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leadwiz")
        .join("config.json")
}

pub fn load_config(path: &Path) -> Result<WizardConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: WizardConfig =
        serde_json::from_slice(&bytes).context("parse wizard config JSON")?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(path: &Path, config: &WizardConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create config dir")?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize wizard config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Environment values win over file values.
pub fn apply_env_overrides(config: &mut WizardConfig) {
    if let Some(endpoint) = env_value("LEADWIZ_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(number) = env_value("LEADWIZ_WHATSAPP") {
        config.whatsapp_number = number;
    }
    if let Some(brand) = env_value("LEADWIZ_BRAND") {
        config.brand = brand;
    }
    if let Some(dir) = env_value("LEADWIZ_SESSION_DIR") {
        config.session_dir = Some(PathBuf::from(dir));
    }
}

/// Load the effective config: file if present, defaults otherwise, then
/// environment overrides, validated as a whole.
pub fn resolve_config(path: Option<&Path>) -> Result<WizardConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let mut config = if path.exists() {
        load_config(&path)?
    } else {
        default_config()
    };
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Validate schema and the fields that feed URLs directly.
pub fn validate_config(config: &WizardConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
        return Err(anyhow!(
            "endpoint must be an http(s) URL (got {:?})",
            config.endpoint
        ));
    }
    let all_digits = config.whatsapp_number.chars().all(|c| c.is_ascii_digit());
    if !all_digits || !(10..=15).contains(&config.whatsapp_number.len()) {
        return Err(anyhow!(
            "whatsapp_number must be 10-15 digits including country code, no '+' (got {:?})",
            config.whatsapp_number
        ));
    }
    if config.brand.trim().is_empty() {
        return Err(anyhow!("brand must be non-empty"));
    }
    if config.brochure_filename.trim().is_empty() {
        return Err(anyhow!("brochure_filename must be non-empty"));
    }
    Ok(())
}

/// Session directory precedence: CLI flag, then config, then the platform
/// data dir.
pub fn session_root(config: &WizardConfig, cli_dir: Option<&Path>) -> PathBuf {
    cli_dir
        .map(Path::to_path_buf)
        .or_else(|| config.session_dir.clone())
        .unwrap_or_else(FileStore::default_root)
}

/// The flow plan for this deployment, custom file or built in.
pub fn resolve_plan(config: &WizardConfig) -> Result<FlowPlan> {
    match config.flow_plan.as_deref() {
        Some(path) => FlowPlan::load(path),
        None => Ok(FlowPlan::standard()),
    }
}

pub fn handoff_params(config: &WizardConfig) -> HandoffParams {
    HandoffParams {
        brand: config.brand.clone(),
        whatsapp_number: config.whatsapp_number.clone(),
        brochure_source: config.brochure_source.clone(),
        brochure_filename: config.brochure_filename.clone(),
    }
}
