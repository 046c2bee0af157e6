//! # fbxport Core
//!
//! Settings-driven FBX export pipeline for DCC-to-Unreal asset delivery.
//!
//! This crate provides the core engine for fbxport, including:
//! - A schema-validated settings document with defaults, merge, and
//!   canonical JSON serialization
//! - A deterministic mapping from settings to host exporter options
//! - An export orchestrator with texture handling and a sidecar metadata
//!   document written beside every artifact
//!
//! ## Architecture
//!
//! The host 3D application (Maya or any DCC) is reached only through the
//! [`HostEnvironment`] trait: a selection query, a mesh/material export
//! primitive, and a texture enumeration. This keeps the pipeline usable
//! from three directions:
//!
//! - **In-session**: the DCC's scripting layer implements the trait and
//!   calls straight into the pipeline (see fbxport-python)
//! - **Batch**: headless automation drives the same pipeline through a
//!   subprocess-backed host (see fbxport-cli)
//! - **Tests**: a mock host exercises every orchestration contract without
//!   a DCC in sight
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fbxport_core::{export_fbx, SceneObject, SettingsStore};
//! use serde_json::json;
//! use std::path::Path;
//! # struct MyHost;
//! # impl fbxport_core::HostEnvironment for MyHost {
//! #     fn current_selection(&self) -> Vec<SceneObject> { vec![] }
//! #     fn export_mesh(&self, _: &[SceneObject], _: &Path,
//! #         _: &fbxport_core::HostExportOptions) -> anyhow::Result<()> { Ok(()) }
//! #     fn enumerate_textures(&self, _: &[SceneObject]) -> Vec<fbxport_core::TextureRef> { vec![] }
//! # }
//!
//! let mut store = SettingsStore::new();
//! store.set("transform.rotation", json!([0.0, 90.0, 0.0]))?;
//! store.set("metadata.author", json!("env team"))?;
//!
//! let host = MyHost;
//! let selection = vec![SceneObject::new("pCube1")];
//! let outcome = export_fbx(
//!     &host,
//!     &selection,
//!     Path::new("/out/SM_Prop.fbx"),
//!     &store.snapshot(),
//!     "",
//! )?;
//!
//! println!("{}", outcome);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod export;
pub mod host;
pub mod options;
pub mod settings;

#[cfg(test)]
pub mod test_integration;

// Re-export commonly used types
pub use export::{
    export_fbx, ExportError, ExportOutcome, ExportPhase, ExportPipeline,
};
pub use host::{HostEnvironment, SceneObject, TextureRef};
pub use options::{map_options, resolve_asset_name, HostExportOptions};
pub use settings::{
    CustomProperties, ExportSettings, NormalGenerationMethod, NormalImportMethod,
    SettingsError, SettingsStore, UnitSystem, UpAxis,
};

use tracing::info;

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the fbxport core library with structured logging
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fbxport_core=info".into()),
        )
        .with_target(false)
        .try_init();

    info!("Initializing fbxport core v{}", VERSION);
}
