//! Mapping from the settings document to host exporter options
//!
//! [`map_options`] is a pure, deterministic function of the settings
//! document: no I/O, no clock, no host calls. Texture handling, Unreal
//! import hints, and asset metadata never enter the bundle; textures are
//! consumed by the orchestrator's texture step, the rest exists only for
//! the metadata document.

use crate::settings::{ExportSettings, UnitSystem, UpAxis, Vec3};
use std::path::Path;

/// The discrete option set understood by the host export primitive.
///
/// Opaque to callers beyond construction and [`to_option_string`]
/// (Self::to_option_string); hosts that take structured options can read the
/// fields directly.
#[derive(Debug, Clone, PartialEq)]
pub struct HostExportOptions {
    pub smoothing_groups: bool,
    pub tangents_and_binormals: bool,
    pub preserve_instances: bool,
    /// Grouping and material flags are always on for static-mesh delivery
    pub export_materials: bool,
    /// Animation and skeleton export are always off for static-mesh delivery
    pub export_animations: bool,
    pub export_skeleton: bool,
    pub up_axis: UpAxis,
    pub unit_conversion: UnitSystem,
    /// Post-bake Euler rotation in degrees, applied about X, Y, Z in that
    /// fixed order after axis/unit conversion
    pub bake_rotation_deg: Vec3,
    pub bake_scale: Vec3,
    pub bake_translation: Vec3,
    pub unreal_compatible: bool,
}

impl HostExportOptions {
    /// Render the `key=value;...` option string consumed by MEL-style FBX
    /// exporters.
    pub fn to_option_string(&self) -> String {
        let flag = |b: bool| if b { 1 } else { 0 };
        let options = [
            "groups=1".to_string(),
            "ptgroups=1".to_string(),
            format!("materials={}", flag(self.export_materials)),
            "smoothing=1".to_string(),
            format!("smoothingGroups={}", flag(self.smoothing_groups)),
            format!("preserveInstances={}", flag(self.preserve_instances)),
            format!("tangents={}", flag(self.tangents_and_binormals)),
            format!("animations={}", flag(self.export_animations)),
            format!("skeleton={}", flag(self.export_skeleton)),
            format!("up={}", self.up_axis.as_str()),
            format!("unitconversion={}", self.unit_conversion.as_str()),
            format!("exportUnrealCompatible={}", flag(self.unreal_compatible)),
            format!("rotateX={}", self.bake_rotation_deg[0]),
            format!("rotateY={}", self.bake_rotation_deg[1]),
            format!("rotateZ={}", self.bake_rotation_deg[2]),
        ];
        options.join(";")
    }
}

/// Translate a settings document into the host option bundle.
///
/// Each wired `geometry` flag maps 1:1 to an exporter flag.
/// `preserve_edge_orientation` and `turbosmooth` are document-compatibility
/// placeholders with no exporter mapping; they are intentionally absent
/// here.
pub fn map_options(settings: &ExportSettings) -> HostExportOptions {
    HostExportOptions {
        smoothing_groups: settings.geometry.smoothing_groups,
        tangents_and_binormals: settings.geometry.tangents_and_binormals,
        preserve_instances: settings.geometry.preserve_instances,
        export_materials: true,
        export_animations: false,
        export_skeleton: false,
        up_axis: settings.coordinate_system.up_axis,
        unit_conversion: settings.coordinate_system.unit_system,
        bake_rotation_deg: settings.transform.rotation,
        bake_scale: settings.transform.scale,
        bake_translation: settings.transform.translation,
        unreal_compatible: true,
    }
}

/// Resolve the logical asset name for an export run.
///
/// An explicit non-empty name wins; otherwise the name is the filename stem
/// of the target path (no extension, no directory). Returns `None` when
/// neither yields a usable name.
pub fn resolve_asset_name(asset_name: &str, target_path: &Path) -> Option<String> {
    let trimmed = asset_name.trim();
    if !trimmed.is_empty() {
        return Some(trimmed.to_string());
    }
    target_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
