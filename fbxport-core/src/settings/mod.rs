//! Settings model for the export pipeline
//!
//! The canonical settings document is a tree of named sections
//! (`geometry`, `coordinate_system`, `transform`, `textures`,
//! `unreal_import_settings`, `metadata`), each with schema-defined defaults
//! and validation. [`SettingsStore`] is the mutable in-memory instance with
//! merge/update, reset, and canonical JSON (de)serialization.

mod schema;
mod store;

pub use schema::{
    AssetMetadata, CoordinateSettings, CustomProperties, ExportSettings, GeometrySettings,
    NormalGenerationMethod, NormalImportMethod, TextureSettings, TransformSettings,
    UnitSystem, UnrealImportSettings, UpAxis, Vec3, SECTIONS,
};
pub use store::{SettingsError, SettingsStore};
