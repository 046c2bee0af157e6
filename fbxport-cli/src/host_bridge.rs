//! Host environment backed by a scene manifest and an exporter subprocess
//!
//! The mesh export primitive is an external command, typically a headless
//! DCC runner (`mayapy`, `blender --background`, a studio wrapper script).
//! fbxport passes the target path, the rendered option string, and the
//! object list through argument placeholders and treats a non-zero exit
//! status as a host export failure.

use crate::manifest::SceneManifest;
use anyhow::{bail, Context, Result};
use fbxport_core::{HostEnvironment, HostExportOptions, SceneObject, TextureRef};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Placeholder expanded to the export target path
pub const TARGET_PLACEHOLDER: &str = "{target}";
/// Placeholder expanded to the `key=value;...` option string
pub const OPTIONS_PLACEHOLDER: &str = "{options}";
/// Placeholder expanded to the comma-separated object list
pub const OBJECTS_PLACEHOLDER: &str = "{objects}";

/// External exporter command template.
///
/// Arguments may contain `{target}`, `{options}`, and `{objects}`; when no
/// argument mentions `{target}`, the target path and option string are
/// appended so a bare program name works out of the box.
#[derive(Debug, Clone)]
pub struct CommandExporter {
    program: String,
    args: Vec<String>,
}

impl CommandExporter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn resolved_args(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> Vec<String> {
        let target = target_path.to_string_lossy().into_owned();
        let option_string = options.to_option_string();
        let object_list = objects
            .iter()
            .map(|o| o.name())
            .collect::<Vec<_>>()
            .join(",");

        let mut resolved: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace(TARGET_PLACEHOLDER, &target)
                    .replace(OPTIONS_PLACEHOLDER, &option_string)
                    .replace(OBJECTS_PLACEHOLDER, &object_list)
            })
            .collect();

        if !self.args.iter().any(|a| a.contains(TARGET_PLACEHOLDER)) {
            resolved.push(target);
            resolved.push(option_string);
        }
        resolved
    }

    fn run(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> Result<()> {
        let args = self.resolved_args(objects, target_path, options);
        debug!("running exporter: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("failed to launch exporter '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "exporter '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}

/// [`HostEnvironment`] for batch runs: selection and textures come from the
/// scene manifest, the export primitive is the exporter subprocess.
pub struct ManifestHost {
    manifest: SceneManifest,
    exporter: CommandExporter,
}

impl ManifestHost {
    pub fn new(manifest: SceneManifest, exporter: CommandExporter) -> Self {
        Self { manifest, exporter }
    }
}

impl HostEnvironment for ManifestHost {
    fn current_selection(&self) -> Vec<SceneObject> {
        self.manifest.selection()
    }

    fn export_mesh(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> Result<()> {
        self.exporter.run(objects, target_path, options)
    }

    fn enumerate_textures(&self, objects: &[SceneObject]) -> Vec<TextureRef> {
        self.manifest.textures_for(objects)
    }
}
