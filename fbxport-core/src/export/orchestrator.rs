use super::metadata::{self, ArtifactInfo, RunRecord};
use crate::host::{HostEnvironment, SceneObject};
use crate::options;
use crate::settings::{ExportSettings, SettingsError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors that can occur during an export run
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing is selected for export")]
    NoSelection,

    #[error("invalid export path '{}': {}", .path.display(), .reason)]
    InvalidPath { path: PathBuf, reason: String },

    #[error("texture folder is required when texture export or copying is enabled")]
    TextureFolderRequired,

    #[error("host export failed: {0}")]
    HostExport(#[source] anyhow::Error),

    #[error("failed to write metadata document '{}': {}", .path.display(), .source)]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("an export targeting '{}' is already in flight", .0.display())]
    Conflict(PathBuf),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Steps of an export run, in execution order.
///
/// `Done` and `Failed` are terminal; a run never retries a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Validating,
    Exporting,
    WritingTextures,
    WritingMetadata,
    Done,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportPhase::Idle => "idle",
            ExportPhase::Validating => "validating",
            ExportPhase::Exporting => "exporting",
            ExportPhase::WritingTextures => "writing textures",
            ExportPhase::WritingMetadata => "writing metadata",
            ExportPhase::Done => "done",
            ExportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed export run
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Path of the binary artifact written by the host
    pub output_path: PathBuf,
    /// Path of the sidecar metadata document
    pub metadata_path: PathBuf,
    /// Per-file texture failures; non-empty means success with warnings
    pub texture_warnings: Vec<String>,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
    /// Run identity recorded in the metadata document
    pub session_id: Uuid,
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} ({} texture warning(s), {}ms)",
            self.output_path.display(),
            self.texture_warnings.len(),
            self.duration_ms
        )
    }
}

/// Drives the end-to-end export sequence against a host environment.
///
/// A pipeline is cheap to keep around; each [`export`](Self::export) call is
/// a single-use run through Validating → Exporting → WritingTextures →
/// WritingMetadata. Concurrent runs through the same pipeline targeting the
/// same output path are rejected with [`ExportError::Conflict`] rather than
/// allowed to interleave.
pub struct ExportPipeline<H> {
    host: H,
    in_flight: Mutex<HashSet<PathBuf>>,
}

impl<H: HostEnvironment> ExportPipeline<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Export the host's current selection; see [`export`](Self::export).
    pub fn export_current_selection(
        &self,
        target_path: &Path,
        settings: &ExportSettings,
        asset_name: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let selection = self.host.current_selection();
        self.export(&selection, target_path, settings, asset_name)
    }

    /// Run a full export of `selection` to `target_path`.
    ///
    /// `settings` is read as a snapshot: the caller must not mutate the
    /// originating store while the run is in flight. An empty `asset_name`
    /// is derived from the target path's filename stem.
    pub fn export(
        &self,
        selection: &[SceneObject],
        target_path: &Path,
        settings: &ExportSettings,
        asset_name: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let mut phase = ExportPhase::Idle;
        let result = self.run(selection, target_path, settings, asset_name, &mut phase);
        match &result {
            Ok(outcome) => info!(
                "export finished: {} -> {}",
                outcome.output_path.display(),
                outcome.metadata_path.display()
            ),
            Err(err) => warn!("export failed while {}: {}", phase, err),
        }
        result
    }

    fn run(
        &self,
        selection: &[SceneObject],
        target_path: &Path,
        settings: &ExportSettings,
        asset_name: &str,
        phase: &mut ExportPhase,
    ) -> Result<ExportOutcome, ExportError> {
        let started = std::time::Instant::now();
        let session_id = Uuid::new_v4();

        let _guard = TargetGuard::acquire(&self.in_flight, normalize(target_path))?;

        *phase = ExportPhase::Validating;
        if selection.is_empty() {
            return Err(ExportError::NoSelection);
        }
        settings
            .validate()
            .map_err(|msg| ExportError::Settings(SettingsError::Schema(msg)))?;

        let wants_textures =
            settings.textures.export_textures || settings.textures.copy_textures;
        if wants_textures && settings.textures.texture_folder.trim().is_empty() {
            return Err(ExportError::TextureFolderRequired);
        }

        let parent = target_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ExportError::InvalidPath {
                path: target_path.to_path_buf(),
                reason: "no parent directory".to_string(),
            })?;
        std::fs::create_dir_all(parent).map_err(|e| ExportError::InvalidPath {
            path: target_path.to_path_buf(),
            reason: format!("parent directory is not writable: {}", e),
        })?;

        let asset_name = options::resolve_asset_name(asset_name, target_path).ok_or_else(
            || ExportError::InvalidPath {
                path: target_path.to_path_buf(),
                reason: "cannot derive an asset name from the path".to_string(),
            },
        )?;
        let output_path = parent.join(format!("{}.fbx", asset_name));
        let metadata_path = metadata::metadata_path(parent, &asset_name);

        *phase = ExportPhase::Exporting;
        info!(
            "exporting {} object(s) as '{}' to {}",
            selection.len(),
            asset_name,
            output_path.display()
        );
        let host_options = options::map_options(settings);
        self.host
            .export_mesh(selection, &output_path, &host_options)
            .map_err(ExportError::HostExport)?;

        let (texture_warnings, texture_files) = if wants_textures {
            *phase = ExportPhase::WritingTextures;
            self.write_textures(selection, settings, &asset_name)
        } else {
            (Vec::new(), Vec::new())
        };

        *phase = ExportPhase::WritingMetadata;
        let artifact = ArtifactInfo::from_file(&output_path);
        let record = RunRecord {
            session_id,
            asset_name,
            output_path: output_path.clone(),
            texture_warnings: texture_warnings.clone(),
            texture_files,
        };
        let document = metadata::build_document(settings, &record, artifact.as_ref());
        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::MetadataWrite {
                path: metadata_path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;
        std::fs::write(&metadata_path, text).map_err(|e| ExportError::MetadataWrite {
            path: metadata_path.clone(),
            source: e,
        })?;

        *phase = ExportPhase::Done;
        Ok(ExportOutcome {
            output_path,
            metadata_path,
            texture_warnings,
            duration_ms: started.elapsed().as_millis() as u64,
            session_id,
        })
    }

    /// Texture step: enumerate once, dedup by file name, then copy into
    /// `<texture_folder>/<asset_name>/` when copying is enabled.
    ///
    /// Per-file failures become warnings, never run failures: a missing
    /// texture must not block delivery of the mesh artifact. Copies are
    /// independent per file and run on the rayon pool; all of them complete
    /// before this returns, since the warnings feed the metadata document.
    fn write_textures(
        &self,
        selection: &[SceneObject],
        settings: &ExportSettings,
        asset_name: &str,
    ) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();

        let refs = self.host.enumerate_textures(selection);
        let dest_dir = Path::new(&settings.textures.texture_folder).join(asset_name);
        if let Err(e) = std::fs::create_dir_all(&dest_dir) {
            warnings.push(format!(
                "could not create texture folder '{}': {}",
                dest_dir.display(),
                e
            ));
            return (warnings, Vec::new());
        }

        // The same file is often wired into several materials; copy it once.
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for texture in refs {
            match texture.path.file_name().map(|n| n.to_owned()) {
                Some(name) => {
                    if seen.insert(name.clone()) {
                        unique.push((texture, name));
                    }
                }
                None => warnings.push(format!(
                    "texture for material '{}' has no file name: '{}'",
                    texture.material,
                    texture.path.display()
                )),
            }
        }

        let texture_files: Vec<String> = unique
            .iter()
            .map(|(_, name)| name.to_string_lossy().into_owned())
            .collect();

        if settings.textures.copy_textures {
            let copy_warnings: Vec<String> = unique
                .par_iter()
                .filter_map(|(texture, name)| {
                    let dest = dest_dir.join(name);
                    match std::fs::copy(&texture.path, &dest) {
                        Ok(_) => None,
                        Err(e) => Some(format!(
                            "failed to copy texture '{}' (material '{}'): {}",
                            texture.path.display(),
                            texture.material,
                            e
                        )),
                    }
                })
                .collect();
            for warning in &copy_warnings {
                warn!("{}", warning);
            }
            warnings.extend(copy_warnings);
        }

        (warnings, texture_files)
    }
}

/// Programmatic entry point for batch automation: one call, no pipeline to
/// hold on to. Per-target conflict detection only spans this single call;
/// long-lived callers should share an [`ExportPipeline`].
pub fn export_fbx<H: HostEnvironment>(
    host: &H,
    selection: &[SceneObject],
    target_path: &Path,
    settings: &ExportSettings,
    asset_name: &str,
) -> Result<ExportOutcome, ExportError> {
    ExportPipeline::new(host).export(selection, target_path, settings, asset_name)
}

/// Lexical cleanup so `./out/x.fbx` and `out/x.fbx` collide in the
/// in-flight registry
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Removes its target from the in-flight registry when the run ends,
/// whichever way it ends
struct TargetGuard<'a> {
    registry: &'a Mutex<HashSet<PathBuf>>,
    key: PathBuf,
}

impl<'a> TargetGuard<'a> {
    fn acquire(
        registry: &'a Mutex<HashSet<PathBuf>>,
        key: PathBuf,
    ) -> Result<Self, ExportError> {
        let mut in_flight = registry.lock().unwrap();
        if !in_flight.insert(key.clone()) {
            return Err(ExportError::Conflict(key));
        }
        drop(in_flight);
        Ok(Self { registry, key })
    }
}

impl Drop for TargetGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().unwrap().remove(&self.key);
    }
}
