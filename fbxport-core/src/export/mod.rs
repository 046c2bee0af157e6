//! Export orchestration
//!
//! Given a selection, a target path, and a settings snapshot, this module
//! drives the end-to-end sequence: validate preconditions, resolve the asset
//! name, map options, invoke the host export primitive, copy textures, and
//! write the sidecar metadata document beside the binary artifact.

mod metadata;
mod orchestrator;

pub use metadata::{build_document, metadata_path, ArtifactInfo, RunRecord};
pub use orchestrator::{
    export_fbx, ExportError, ExportOutcome, ExportPhase, ExportPipeline,
};
