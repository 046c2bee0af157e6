//! Sidecar metadata document
//!
//! Every successful export leaves a JSON document beside the binary
//! artifact: the full settings document (sections at the top level) plus the
//! run-time facts a downstream import tool or audit needs. Path convention:
//! `<dir>/<asset_name>_metadata_fbx.json` next to `<dir>/<asset_name>.fbx`.

use crate::settings::ExportSettings;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Run-time facts recorded alongside the settings sections
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub session_id: Uuid,
    pub asset_name: String,
    pub output_path: PathBuf,
    pub texture_warnings: Vec<String>,
    /// Original file names of textures enumerated for this asset, after
    /// deduplication
    pub texture_files: Vec<String>,
}

/// Size and checksum of the exported binary, computed best-effort after the
/// host export returns
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub size_bytes: u64,
    pub blake3: String,
}

impl ArtifactInfo {
    /// Hash the artifact at `path`; `None` if it cannot be read (the host
    /// owns the file, the sidecar only describes it).
    pub fn from_file(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        Some(Self {
            size_bytes: bytes.len() as u64,
            blake3: blake3::hash(&bytes).to_hex().to_string(),
        })
    }
}

/// Conventional sidecar path for an asset exported into `dir`
pub fn metadata_path(dir: &Path, asset_name: &str) -> PathBuf {
    dir.join(format!("{}_metadata_fbx.json", asset_name))
}

/// Assemble the sidecar document.
///
/// The settings sections come first in canonical order, then the run fields.
/// `metadata.date_created` inside the settings block is stamped with the
/// same timestamp as the top-level `date_created`.
pub fn build_document(
    settings: &ExportSettings,
    run: &RunRecord,
    artifact: Option<&ArtifactInfo>,
) -> Value {
    let date_created = Utc::now().to_rfc3339();

    let mut stamped = settings.clone();
    stamped.metadata.date_created = date_created.clone();

    let mut document = match serde_json::to_value(&stamped) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    document.insert("date_created".to_string(), json!(date_created));
    document.insert("asset_name".to_string(), json!(run.asset_name));
    document.insert("output_path".to_string(), json!(run.output_path));
    document.insert("texture_warnings".to_string(), json!(run.texture_warnings));
    document.insert("texture_files".to_string(), json!(run.texture_files));
    document.insert("session_id".to_string(), json!(run.session_id));
    document.insert(
        "generator".to_string(),
        json!(format!("fbxport-core v{}", env!("CARGO_PKG_VERSION"))),
    );
    if let Some(artifact) = artifact {
        document.insert(
            "artifact".to_string(),
            json!({
                "size_bytes": artifact.size_bytes,
                "blake3": artifact.blake3,
            }),
        );
    }

    Value::Object(document)
}
