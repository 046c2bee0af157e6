use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 3-component vector of real numbers (rotation, scale, translation).
///
/// Serde enforces the arity: a 2- or 4-element array fails deserialization.
pub type Vec3 = [f64; 3];

/// Up axis of the exported coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    X,
    Y,
    Z,
}

impl UpAxis {
    pub const ALLOWED: &'static [&'static str] = &["x", "y", "z"];

    /// Lowercase token used in the settings document and exporter options
    pub fn as_str(&self) -> &'static str {
        match self {
            UpAxis::X => "x",
            UpAxis::Y => "y",
            UpAxis::Z => "z",
        }
    }
}

/// Linear unit system of the exported geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "ft")]
    Feet,
}

impl UnitSystem {
    pub const ALLOWED: &'static [&'static str] = &["mm", "cm", "m", "in", "ft"];

    /// Token used in the settings document and exporter options
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Millimeters => "mm",
            UnitSystem::Centimeters => "cm",
            UnitSystem::Meters => "m",
            UnitSystem::Inches => "in",
            UnitSystem::Feet => "ft",
        }
    }
}

/// How Unreal should obtain normals when importing the asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalImportMethod {
    ComputeNormals,
    ImportNormals,
    ImportNormalsAndTangents,
}

impl NormalImportMethod {
    pub const ALLOWED: &'static [&'static str] = &[
        "ComputeNormals",
        "ImportNormals",
        "ImportNormalsAndTangents",
    ];
}

/// Tangent-space generation method for computed normals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalGenerationMethod {
    MikkTSpace,
    BuiltIn,
}

impl NormalGenerationMethod {
    pub const ALLOWED: &'static [&'static str] = &["MikkTSpace", "BuiltIn"];
}

/// Geometry handling flags passed to the host exporter.
///
/// `preserve_edge_orientation` and `turbosmooth` are carried in the document
/// for compatibility but are not wired to any exporter flag; see
/// `options::map_options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometrySettings {
    pub smoothing_groups: bool,
    pub tangents_and_binormals: bool,
    pub preserve_instances: bool,
    pub preserve_edge_orientation: bool,
    pub turbosmooth: bool,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            smoothing_groups: true,
            tangents_and_binormals: true,
            preserve_instances: true,
            preserve_edge_orientation: true,
            turbosmooth: true,
        }
    }
}

/// Target coordinate conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinateSettings {
    pub up_axis: UpAxis,
    pub unit_system: UnitSystem,
}

impl Default for CoordinateSettings {
    fn default() -> Self {
        Self {
            up_axis: UpAxis::Z,
            unit_system: UnitSystem::Centimeters,
        }
    }
}

/// Transform adjustments baked into the exported geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformSettings {
    /// Euler rotation in degrees, applied about X, Y, Z in that order
    pub rotation: Vec3,
    /// Per-axis scale multiplier
    pub scale: Vec3,
    /// Per-axis translation in linear units
    pub translation: Vec3,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            rotation: [0.0, 90.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            translation: [0.0, 0.0, 0.0],
        }
    }
}

/// Texture handling for the export run.
///
/// `texture_folder` may stay empty while the document is being edited; the
/// orchestrator rejects the run if either flag is set and the folder is
/// still empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TextureSettings {
    pub export_textures: bool,
    pub texture_folder: String,
    pub copy_textures: bool,
}

/// Import-side hints for Unreal.
///
/// These never reach the host exporter; they are recorded in the metadata
/// document for the downstream import tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnrealImportSettings {
    pub auto_generate_collision: bool,
    pub generate_lightmap_uvs: bool,
    pub import_materials: bool,
    pub import_textures: bool,
    pub combine_meshes: bool,
    pub normal_import_method: NormalImportMethod,
    pub normal_generation_method: NormalGenerationMethod,
    pub scale_factor: f64,
}

impl Default for UnrealImportSettings {
    fn default() -> Self {
        Self {
            auto_generate_collision: true,
            generate_lightmap_uvs: true,
            import_materials: true,
            import_textures: false,
            combine_meshes: false,
            normal_import_method: NormalImportMethod::ComputeNormals,
            normal_generation_method: NormalGenerationMethod::MikkTSpace,
            scale_factor: 1.0,
        }
    }
}

/// Freeform asset metadata recorded in the sidecar document.
///
/// `date_created` is stamped by the orchestrator at export time and is not
/// meaningful while the document is being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AssetMetadata {
    pub author: String,
    pub project: String,
    pub version: String,
    pub description: String,
    pub date_created: String,
    pub tags: Vec<String>,
    pub custom_properties: CustomProperties,
}

/// String key/value pairs in insertion order.
///
/// Keys are unique; writing an existing key replaces its value in place.
/// Equality is set equality, so two documents that list the same pairs in
/// different order compare equal.
#[derive(Debug, Clone, Default)]
pub struct CustomProperties(Vec<(String, String)>);

impl CustomProperties {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace; replacement keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PartialEq for CustomProperties {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .all(|(k, v)| other.get(k) == Some(v.as_str()))
    }
}

impl Serialize for CustomProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CustomProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropsVisitor;

        impl<'de> Visitor<'de> for PropsVisitor {
            type Value = CustomProperties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut props = CustomProperties::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    props.insert(key, value);
                }
                Ok(props)
            }
        }

        deserializer.deserialize_map(PropsVisitor)
    }
}

/// The canonical settings document.
///
/// Every section and key has a schema default, so a fresh document is always
/// fully populated. Section order here is the canonical serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    pub geometry: GeometrySettings,
    pub coordinate_system: CoordinateSettings,
    pub transform: TransformSettings,
    pub textures: TextureSettings,
    pub unreal_import_settings: UnrealImportSettings,
    pub metadata: AssetMetadata,
}

impl ExportSettings {
    /// Structural validation beyond what serde enforces.
    ///
    /// Cross-field consistency (texture folder when texture export is on) is
    /// an orchestrator precondition, not a schema rule.
    pub fn validate(&self) -> Result<(), String> {
        if !self.unreal_import_settings.scale_factor.is_finite()
            || self.unreal_import_settings.scale_factor <= 0.0
        {
            return Err(format!(
                "unreal_import_settings.scale_factor must be a positive number, got {}",
                self.unreal_import_settings.scale_factor
            ));
        }
        for (name, vec) in [
            ("rotation", &self.transform.rotation),
            ("scale", &self.transform.scale),
            ("translation", &self.transform.translation),
        ] {
            if vec.iter().any(|c| !c.is_finite()) {
                return Err(format!("transform.{} contains a non-finite component", name));
            }
        }
        Ok(())
    }
}

/// Value shape of a settings leaf, used by the store to reject bad
/// assignments before they touch the typed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Bool,
    Number,
    Text,
    Vec3,
    TextList,
    TextMap,
    Enum(&'static [&'static str]),
}

/// Section names in canonical order
pub const SECTIONS: &[&str] = &[
    "geometry",
    "coordinate_system",
    "transform",
    "textures",
    "unreal_import_settings",
    "metadata",
];

/// Look up the shape of `section.key`, or `None` if the path is not part of
/// the schema.
pub fn leaf_kind(section: &str, key: &str) -> Option<LeafKind> {
    use LeafKind::*;
    let kind = match (section, key) {
        ("geometry", "smoothing_groups")
        | ("geometry", "tangents_and_binormals")
        | ("geometry", "preserve_instances")
        | ("geometry", "preserve_edge_orientation")
        | ("geometry", "turbosmooth") => Bool,

        ("coordinate_system", "up_axis") => Enum(UpAxis::ALLOWED),
        ("coordinate_system", "unit_system") => Enum(UnitSystem::ALLOWED),

        ("transform", "rotation") | ("transform", "scale") | ("transform", "translation") => Vec3,

        ("textures", "export_textures") | ("textures", "copy_textures") => Bool,
        ("textures", "texture_folder") => Text,

        ("unreal_import_settings", "auto_generate_collision")
        | ("unreal_import_settings", "generate_lightmap_uvs")
        | ("unreal_import_settings", "import_materials")
        | ("unreal_import_settings", "import_textures")
        | ("unreal_import_settings", "combine_meshes") => Bool,
        ("unreal_import_settings", "normal_import_method") => Enum(NormalImportMethod::ALLOWED),
        ("unreal_import_settings", "normal_generation_method") => {
            Enum(NormalGenerationMethod::ALLOWED)
        }
        ("unreal_import_settings", "scale_factor") => Number,

        ("metadata", "author")
        | ("metadata", "project")
        | ("metadata", "version")
        | ("metadata", "description")
        | ("metadata", "date_created") => Text,
        ("metadata", "tags") => TextList,
        ("metadata", "custom_properties") => TextMap,

        _ => return None,
    };
    Some(kind)
}
