pub mod export;
pub mod settings;

use anyhow::{Context, Result};
use fbxport_core::SettingsStore;
use serde_json::Value;
use std::path::Path;

/// Load a settings document, or schema defaults when no path is given
pub fn load_store(path: Option<&Path>) -> Result<SettingsStore> {
    match path {
        None => Ok(SettingsStore::new()),
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| {
                format!("failed to read settings document '{}'", path.display())
            })?;
            SettingsStore::deserialize(&text)
                .with_context(|| format!("invalid settings document '{}'", path.display()))
        }
    }
}

/// Apply `section.key=value` overrides in order.
///
/// Values are parsed as JSON; bare words fall back to plain strings so
/// `--set metadata.author=jo` works without quoting.
pub fn apply_overrides(store: &mut SettingsStore, overrides: &[String]) -> Result<()> {
    for entry in overrides {
        let (path, raw) = entry
            .split_once('=')
            .with_context(|| format!("override '{}' is not of the form path=value", entry))?;
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        store
            .set(path, value)
            .with_context(|| format!("cannot apply override '{}'", entry))?;
    }
    Ok(())
}
