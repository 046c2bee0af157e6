use super::{apply_overrides, load_store};
use crate::host_bridge::{CommandExporter, ManifestHost};
use crate::manifest::SceneManifest;
use crate::ui;
use anyhow::{Context, Result};
use clap::Args;
use fbxport_core::{export, map_options, resolve_asset_name, ExportPipeline};
use std::path::PathBuf;

/// Show what an export would do without touching a host
#[derive(Args)]
pub struct PlanCommand {
    /// Settings document (schema defaults when omitted)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Target path for the binary artifact
    #[arg(long)]
    pub target: PathBuf,

    /// Explicit asset name; derived from the target path when empty
    #[arg(long, default_value = "")]
    pub name: String,

    /// Leaf overrides of the form section.key=value
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub overrides: Vec<String>,
}

impl PlanCommand {
    pub fn execute(&self) -> Result<()> {
        let mut store = load_store(self.settings.as_deref())?;
        apply_overrides(&mut store, &self.overrides)?;
        let settings = store.snapshot();

        let asset_name = resolve_asset_name(&self.name, &self.target)
            .context("cannot derive an asset name from the target path")?;
        let parent = self
            .target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .context("target path has no parent directory")?;
        let output_path = parent.join(format!("{}.fbx", asset_name));
        let metadata_path = export::metadata_path(parent, &asset_name);

        let wants_textures =
            settings.textures.export_textures || settings.textures.copy_textures;
        let texture_step = if wants_textures {
            format!(
                "{}/{}/ (copy: {})",
                settings.textures.texture_folder, asset_name, settings.textures.copy_textures
            )
        } else {
            "skipped".to_string()
        };

        ui::print_table(
            "Export plan",
            &[
                ("Asset name".to_string(), asset_name),
                ("Artifact".to_string(), output_path.display().to_string()),
                ("Metadata".to_string(), metadata_path.display().to_string()),
                ("Textures".to_string(), texture_step),
                (
                    "Exporter options".to_string(),
                    map_options(&settings).to_option_string(),
                ),
            ],
        );
        Ok(())
    }
}

/// Export a scene manifest through an external exporter command
#[derive(Args)]
pub struct ExportCommand {
    /// Scene manifest describing objects and their textures
    #[arg(long)]
    pub scene: PathBuf,

    /// Settings document (schema defaults when omitted)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Target path for the binary artifact
    #[arg(long)]
    pub target: PathBuf,

    /// Explicit asset name; derived from the target path when empty
    #[arg(long, default_value = "")]
    pub name: String,

    /// Exporter program invoked as the host export primitive
    #[arg(long)]
    pub exporter: String,

    /// Exporter argument; {target}, {options}, and {objects} expand.
    /// Repeat for each argument
    #[arg(long = "exporter-arg", value_name = "ARG")]
    pub exporter_args: Vec<String>,

    /// Leaf overrides of the form section.key=value
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub overrides: Vec<String>,
}

impl ExportCommand {
    pub fn execute(&self) -> Result<()> {
        let mut store = load_store(self.settings.as_deref())?;
        apply_overrides(&mut store, &self.overrides)?;

        let manifest = SceneManifest::load(&self.scene)?;
        let host = ManifestHost::new(
            manifest,
            CommandExporter::new(&self.exporter, self.exporter_args.clone()),
        );
        let pipeline = ExportPipeline::new(host);

        let spinner = ui::spinner(&format!("Exporting {}", self.target.display()));
        let result =
            pipeline.export_current_selection(&self.target, &store.snapshot(), &self.name);
        spinner.finish_and_clear();

        let outcome = result.with_context(|| {
            format!("export of '{}' failed", self.target.display())
        })?;

        for warning in &outcome.texture_warnings {
            ui::warning(warning);
        }
        ui::success(&format!(
            "Exported {} in {}",
            outcome.output_path.display(),
            ui::format_duration(outcome.duration_ms)
        ));
        ui::info(&format!("Metadata: {}", outcome.metadata_path.display()));
        Ok(())
    }
}
