use super::schema::{self, ExportSettings, LeafKind};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by settings addressing, merging, and (de)serialization
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown settings path: {0}")]
    InvalidPath(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch at '{path}': expected {expected}")]
    TypeMismatch { path: String, expected: String },

    #[error("invalid value '{value}' at '{path}': expected one of {allowed}")]
    InvalidEnum {
        path: String,
        value: String,
        allowed: String,
    },

    #[error("failed to parse settings document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("settings document failed validation: {0}")]
    Schema(String),
}

/// In-memory, mutable instance of the settings schema.
///
/// A store is created fully populated from schema defaults, mutated
/// incrementally through [`set`](Self::set) and [`merge`](Self::merge), and
/// read once per export run via [`snapshot`](Self::snapshot). It is not
/// internally synchronized; callers running concurrent exports must snapshot
/// before handing the document off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    settings: ExportSettings,
}

impl SettingsStore {
    /// Create a store populated from schema defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the current document
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Owned copy of the current document for a single export run
    pub fn snapshot(&self) -> ExportSettings {
        self.settings.clone()
    }

    /// Restore every section to its schema default
    pub fn reset(&mut self) {
        self.settings = ExportSettings::default();
    }

    /// Update one leaf addressed as `section.key`, or `section.key.index`
    /// for a component of a 3-vector.
    ///
    /// The value is validated against the schema before the document is
    /// touched; a failed `set` leaves the store unchanged.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), SettingsError> {
        let mut parts = path.split('.');
        let section = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SettingsError::InvalidPath(path.to_string()))?;
        let key = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SettingsError::InvalidPath(path.to_string()))?;
        let index = parts.next();
        if parts.next().is_some() {
            return Err(SettingsError::InvalidPath(path.to_string()));
        }

        let kind = schema::leaf_kind(section, key)
            .ok_or_else(|| SettingsError::InvalidPath(path.to_string()))?;

        let mut doc = self.to_document();
        match index {
            None => {
                check_value(kind, path, &value)?;
                doc[section][key] = value;
            }
            Some(idx) => {
                if kind != LeafKind::Vec3 {
                    return Err(SettingsError::InvalidPath(path.to_string()));
                }
                let component: usize = idx
                    .parse()
                    .ok()
                    .filter(|i| *i < 3)
                    .ok_or_else(|| SettingsError::InvalidPath(path.to_string()))?;
                if !is_finite_number(&value) {
                    return Err(SettingsError::TypeMismatch {
                        path: path.to_string(),
                        expected: "a number".to_string(),
                    });
                }
                doc[section][key][component] = value;
            }
        }

        self.commit(doc)
    }

    /// Apply a partial document on top of the current one.
    ///
    /// Granularity is `section.key`: keys present in `partial` replace the
    /// current value, keys absent are left untouched. Unknown sections or
    /// keys fail with [`SettingsError::UnknownField`] so operator typos never
    /// vanish silently. Merging the same partial twice is a no-op.
    pub fn merge(&mut self, partial: &Value) -> Result<(), SettingsError> {
        let sections = partial.as_object().ok_or_else(|| SettingsError::TypeMismatch {
            path: "<document>".to_string(),
            expected: "an object of sections".to_string(),
        })?;

        let mut doc = self.to_document();
        for (section, body) in sections {
            if !schema::SECTIONS.contains(&section.as_str()) {
                return Err(SettingsError::UnknownField(section.clone()));
            }
            let keys = body.as_object().ok_or_else(|| SettingsError::TypeMismatch {
                path: section.clone(),
                expected: "an object of keys".to_string(),
            })?;
            for (key, value) in keys {
                let path = format!("{}.{}", section, key);
                let kind = schema::leaf_kind(section, key)
                    .ok_or_else(|| SettingsError::UnknownField(path.clone()))?;
                check_value(kind, &path, value)?;
                doc[section][key.as_str()] = value.clone();
            }
        }

        self.commit(doc)
    }

    /// Canonical text form of the document: pretty JSON with stable key
    /// order (schema declaration order; `tags` and `custom_properties` keep
    /// insertion order).
    pub fn serialize(&self) -> String {
        // ExportSettings serialization cannot fail: no maps with non-string
        // keys, no non-finite floats past validate().
        serde_json::to_string_pretty(&self.settings)
            .unwrap_or_else(|_| String::from("{}"))
    }

    /// Inverse of [`serialize`](Self::serialize).
    ///
    /// Malformed text fails with [`SettingsError::Parse`]; well-formed text
    /// that violates the schema fails with the matching schema error.
    pub fn deserialize(text: &str) -> Result<Self, SettingsError> {
        let raw: Value = serde_json::from_str(text).map_err(SettingsError::Parse)?;
        let settings: ExportSettings =
            serde_json::from_value(raw).map_err(|e| SettingsError::Schema(e.to_string()))?;
        settings.validate().map_err(SettingsError::Schema)?;
        Ok(Self { settings })
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(&self.settings).unwrap_or_else(|_| Value::Null)
    }

    /// Rebuild the typed document from the edited JSON tree and swap it in
    /// only if the result still deserializes and validates.
    fn commit(&mut self, doc: Value) -> Result<(), SettingsError> {
        let settings: ExportSettings =
            serde_json::from_value(doc).map_err(|e| SettingsError::Schema(e.to_string()))?;
        settings.validate().map_err(SettingsError::Schema)?;
        self.settings = settings;
        Ok(())
    }
}

fn is_finite_number(value: &Value) -> bool {
    value.as_f64().map(f64::is_finite).unwrap_or(false)
}

/// Validate a candidate value against the leaf shape before substitution
fn check_value(kind: LeafKind, path: &str, value: &Value) -> Result<(), SettingsError> {
    let mismatch = |expected: &str| SettingsError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
    };

    match kind {
        LeafKind::Bool => value.is_boolean().then_some(()).ok_or_else(|| mismatch("a boolean")),
        LeafKind::Number => is_finite_number(value)
            .then_some(())
            .ok_or_else(|| mismatch("a number")),
        LeafKind::Text => value.is_string().then_some(()).ok_or_else(|| mismatch("a string")),
        LeafKind::Vec3 => {
            let ok = value
                .as_array()
                .map(|a| a.len() == 3 && a.iter().all(is_finite_number))
                .unwrap_or(false);
            ok.then_some(())
                .ok_or_else(|| mismatch("an array of exactly 3 numbers"))
        }
        LeafKind::TextList => {
            let ok = value
                .as_array()
                .map(|a| a.iter().all(Value::is_string))
                .unwrap_or(false);
            ok.then_some(()).ok_or_else(|| mismatch("an array of strings"))
        }
        LeafKind::TextMap => {
            let ok = value
                .as_object()
                .map(|m| m.values().all(Value::is_string))
                .unwrap_or(false);
            ok.then_some(())
                .ok_or_else(|| mismatch("a map of string values"))
        }
        LeafKind::Enum(allowed) => {
            let token = value.as_str().ok_or_else(|| mismatch("a string"))?;
            if allowed.contains(&token) {
                Ok(())
            } else {
                Err(SettingsError::InvalidEnum {
                    path: path.to_string(),
                    value: token.to_string(),
                    allowed: allowed.join(", "),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::{UnitSystem, UpAxis};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn new_store_is_fully_populated() {
        let store = SettingsStore::new();
        let doc: Value = serde_json::from_str(&store.serialize()).unwrap();
        for section in schema::SECTIONS {
            assert!(doc.get(section).is_some(), "missing section {}", section);
        }
    }

    #[test]
    fn set_updates_a_leaf() {
        let mut store = SettingsStore::new();
        store.set("geometry.smoothing_groups", json!(false)).unwrap();
        assert!(!store.settings().geometry.smoothing_groups);

        store.set("coordinate_system.up_axis", json!("y")).unwrap();
        assert_eq!(store.settings().coordinate_system.up_axis, UpAxis::Y);

        store.set("metadata.author", json!("rigging team")).unwrap();
        assert_eq!(store.settings().metadata.author, "rigging team");
    }

    #[test]
    fn set_vector_component() {
        let mut store = SettingsStore::new();
        store.set("transform.rotation.2", json!(45.0)).unwrap();
        assert_eq!(store.settings().transform.rotation, [0.0, 90.0, 45.0]);

        let err = store.set("transform.rotation.3", json!(1.0)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPath(_)));

        let err = store
            .set("geometry.smoothing_groups.0", json!(true))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPath(_)));
    }

    #[test]
    fn set_rejects_unknown_path() {
        let mut store = SettingsStore::new();
        let before = store.snapshot();

        let err = store.set("geometry.smothing_groups", json!(true)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPath(_)));

        let err = store.set("lighting.bounces", json!(2)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPath(_)));

        let err = store.set("geometry", json!(true)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPath(_)));

        assert_eq!(store.snapshot(), before, "failed set must not mutate");
    }

    #[test]
    fn set_rejects_bad_types_and_enums() {
        let mut store = SettingsStore::new();

        let err = store.set("geometry.turbosmooth", json!("yes")).unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));

        let err = store
            .set("coordinate_system.unit_system", json!("furlong"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnum { .. }));

        let err = store.set("transform.scale", json!([1.0, 1.0])).unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));

        let err = store
            .set("unreal_import_settings.scale_factor", json!(-1.0))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Schema(_)));
    }

    #[test]
    fn merge_touches_only_named_keys() {
        let mut store = SettingsStore::new();
        store.set("metadata.author", json!("env team")).unwrap();

        store
            .merge(&json!({
                "geometry": { "smoothing_groups": false },
                "textures": { "export_textures": true, "texture_folder": "/srv/tex" }
            }))
            .unwrap();

        assert!(!store.settings().geometry.smoothing_groups);
        // Siblings of merged keys stay put
        assert!(store.settings().geometry.tangents_and_binormals);
        assert!(store.settings().textures.export_textures);
        assert_eq!(store.settings().textures.texture_folder, "/srv/tex");
        // Untouched sections stay put
        assert_eq!(store.settings().metadata.author, "env team");
        assert_eq!(store.settings().transform.rotation, [0.0, 90.0, 0.0]);
    }

    #[test]
    fn merge_is_idempotent() {
        let partial = json!({
            "transform": { "rotation": [0.0, 0.0, 180.0] },
            "metadata": { "tags": ["prop", "hero"] }
        });

        let mut once = SettingsStore::new();
        once.merge(&partial).unwrap();

        let mut twice = SettingsStore::new();
        twice.merge(&partial).unwrap();
        twice.merge(&partial).unwrap();

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn merge_rejects_unknown_fields() {
        let mut store = SettingsStore::new();
        let before = store.snapshot();

        let err = store
            .merge(&json!({ "geomerty": { "smoothing_groups": false } }))
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnknownField(_)));

        let err = store
            .merge(&json!({ "geometry": { "smooting_groups": false } }))
            .unwrap_err();
        match err {
            SettingsError::UnknownField(path) => assert_eq!(path, "geometry.smooting_groups"),
            other => panic!("expected UnknownField, got {:?}", other),
        }

        assert_eq!(store.snapshot(), before, "failed merge must not mutate");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = SettingsStore::new();
        store.set("geometry.preserve_instances", json!(false)).unwrap();
        store.set("metadata.project", json!("vertical-slice")).unwrap();
        store
            .set("metadata.custom_properties", json!({"lod": "2"}))
            .unwrap();

        store.reset();
        assert_eq!(store.snapshot(), ExportSettings::default());
    }

    #[test]
    fn serialize_deserialize_round_trip() {
        let mut store = SettingsStore::new();
        store.set("coordinate_system.unit_system", json!("m")).unwrap();
        store.set("transform.translation", json!([0.0, 0.0, 12.5])).unwrap();
        store.set("metadata.tags", json!(["prop", "kit"])).unwrap();
        store
            .set("metadata.custom_properties", json!({"b": "2", "a": "1"}))
            .unwrap();

        let text = store.serialize();
        let restored = SettingsStore::deserialize(&text).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn deserialize_classifies_failures() {
        let err = SettingsStore::deserialize("not json {").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));

        // Well-formed JSON, bad enum value
        let mut doc: Value =
            serde_json::from_str(&SettingsStore::new().serialize()).unwrap();
        doc["coordinate_system"]["up_axis"] = json!("w");
        let err = SettingsStore::deserialize(&doc.to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::Schema(_)));

        // Wrong vector arity
        let mut doc: Value =
            serde_json::from_str(&SettingsStore::new().serialize()).unwrap();
        doc["transform"]["rotation"] = json!([0.0, 90.0]);
        let err = SettingsStore::deserialize(&doc.to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::Schema(_)));
    }

    #[test]
    fn serialization_is_stable() {
        let store = SettingsStore::new();
        assert_eq!(store.serialize(), store.serialize());

        let order: Vec<String> = serde_json::from_str::<serde_json::Map<String, Value>>(
            &store.serialize(),
        )
        .unwrap()
        .keys()
        .cloned()
        .collect();
        assert_eq!(order, schema::SECTIONS);
    }

    fn tag_strategy() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z]{1,8}", 0..5)
    }

    proptest! {
        #[test]
        fn round_trip_law(
            smoothing in any::<bool>(),
            rot in proptest::array::uniform3(-360.0f64..360.0),
            scale_factor in 0.01f64..100.0,
            author in "[ -~]{0,24}",
            tags in tag_strategy(),
        ) {
            let mut store = SettingsStore::new();
            store.set("geometry.smoothing_groups", json!(smoothing)).unwrap();
            store.set("transform.rotation", json!(rot)).unwrap();
            store.set("unreal_import_settings.scale_factor", json!(scale_factor)).unwrap();
            store.set("metadata.author", json!(author)).unwrap();
            store.set("metadata.tags", json!(tags)).unwrap();

            let restored = SettingsStore::deserialize(&store.serialize()).unwrap();
            prop_assert_eq!(restored, store);
        }

        #[test]
        fn merge_twice_equals_merge_once(
            folder in "[a-z/]{1,16}",
            up in proptest::sample::select(vec!["x", "y", "z"]),
        ) {
            let partial = json!({
                "textures": { "texture_folder": folder, "copy_textures": true },
                "coordinate_system": { "up_axis": up }
            });

            let mut once = SettingsStore::new();
            once.merge(&partial).unwrap();
            let mut twice = once.clone();
            twice.merge(&partial).unwrap();

            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn unit_system_accessor() {
        assert_eq!(UnitSystem::Centimeters.as_str(), "cm");
        assert_eq!(UpAxis::Z.as_str(), "z");
    }
}
