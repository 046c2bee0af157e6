use super::load_store;
use crate::ui;
use anyhow::{bail, Context, Result};
use clap::Args;
use fbxport_core::SettingsStore;
use serde_json::Value;
use std::path::PathBuf;

/// Print the canonical default settings document
pub fn print_defaults() {
    println!("{}", SettingsStore::new().serialize());
}

/// Validate a settings document against the schema
#[derive(Args)]
pub struct ValidateCommand {
    /// Settings document to check
    pub file: PathBuf,
}

impl ValidateCommand {
    pub fn execute(&self) -> Result<()> {
        let text = std::fs::read_to_string(&self.file).with_context(|| {
            format!("failed to read settings document '{}'", self.file.display())
        })?;

        match SettingsStore::deserialize(&text) {
            Ok(_) => {
                ui::success(&format!("{} is a valid settings document", self.file.display()));
                Ok(())
            }
            Err(err) => {
                ui::error(&err.to_string());
                bail!("'{}' failed validation", self.file.display())
            }
        }
    }
}

/// Merge partial documents onto a base settings document
#[derive(Args)]
pub struct MergeCommand {
    /// Base document; schema defaults are used when omitted
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Partial documents applied in order
    #[arg(required = true)]
    pub overlays: Vec<PathBuf>,
}

impl MergeCommand {
    pub fn execute(&self) -> Result<()> {
        let mut store = load_store(self.base.as_deref())?;

        for overlay in &self.overlays {
            let text = std::fs::read_to_string(overlay)
                .with_context(|| format!("failed to read overlay '{}'", overlay.display()))?;
            let partial: Value = serde_json::from_str(&text)
                .with_context(|| format!("malformed overlay '{}'", overlay.display()))?;
            store
                .merge(&partial)
                .with_context(|| format!("cannot merge overlay '{}'", overlay.display()))?;
        }

        println!("{}", store.serialize());
        Ok(())
    }
}
