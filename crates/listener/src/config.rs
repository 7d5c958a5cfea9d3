use std::{fs, path::PathBuf};

use anyhow::{Context as _, Result, anyhow};
use serde::Deserialize;

use puppet_core::{AliasStorage, PermissionSet, TriggerDefinition, validate_definitions};

/// On-disk configuration for the listener host. Persistence stops here:
/// the engine only ever sees the in-memory values.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// User id of the paired speaker whose messages this instance obeys.
    pub speaker: String,
    /// What that speaker has been granted, including the trigger phrase.
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Alias lists keyed by owning speaker id.
    #[serde(default)]
    pub aliases: AliasStorage,
    /// State-change trigger definitions.
    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,
}

pub fn load_config(path: &PathBuf) -> Result<HostConfig> {
    if !path.exists() {
        return Err(anyhow!(
            "config file not found at {}. Create one or set --config",
            path.display()
        ));
    }
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {}", path.display()))?;
    let cfg: HostConfig = serde_yaml::from_str(&yaml).context("parsing YAML config")?;
    validate_definitions(&cfg.triggers).context("validating trigger definitions")?;
    Ok(cfg)
}
