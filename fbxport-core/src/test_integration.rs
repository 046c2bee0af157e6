use crate::export::{ExportError, ExportPipeline};
use crate::host::{HostEnvironment, SceneObject, TextureRef};
use crate::options::HostExportOptions;
use crate::settings::SettingsStore;
use std::path::Path;
use tempfile::TempDir;

/// A host that behaves like a cooperative DCC session: writes a small
/// binary for the mesh call and reports one texture per material.
struct SessionHost {
    textures: Vec<TextureRef>,
}

impl HostEnvironment for SessionHost {
    fn current_selection(&self) -> Vec<SceneObject> {
        vec![SceneObject::new("pCube1"), SceneObject::new("pCylinder3")]
    }

    fn export_mesh(
        &self,
        _objects: &[SceneObject],
        target_path: &Path,
        _options: &HostExportOptions,
    ) -> anyhow::Result<()> {
        std::fs::write(target_path, b"Kaydara FBX Binary\x20\x20\x00")?;
        Ok(())
    }

    fn enumerate_textures(&self, _objects: &[SceneObject]) -> Vec<TextureRef> {
        self.textures.clone()
    }
}

/// End-to-end run: UI-style store edits, export, and a sidecar that a
/// downstream import tool could actually consume
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn edited_store_drives_a_complete_export() {
        let dir = TempDir::new().unwrap();
        let tex_src = dir.path().join("src_textures");
        std::fs::create_dir_all(&tex_src).unwrap();
        std::fs::write(tex_src.join("crate_albedo.png"), b"png").unwrap();

        // The UI layer edits the store incrementally
        let mut store = SettingsStore::new();
        store
            .merge(&json!({
                "transform": { "rotation": [0.0, 0.0, 0.0] },
                "unreal_import_settings": { "combine_meshes": true },
                "metadata": {
                    "author": "props team",
                    "tags": ["kit", "industrial"],
                    "custom_properties": { "lod_chain": "3" }
                }
            }))
            .unwrap();
        store.set("textures.export_textures", json!(true)).unwrap();
        store.set("textures.copy_textures", json!(true)).unwrap();
        store
            .set(
                "textures.texture_folder",
                json!(dir.path().join("tex").to_string_lossy()),
            )
            .unwrap();

        let host = SessionHost {
            textures: vec![TextureRef {
                material: "crate_mat".to_string(),
                path: tex_src.join("crate_albedo.png"),
            }],
        };
        let pipeline = ExportPipeline::new(host);
        let outcome = pipeline
            .export_current_selection(
                &dir.path().join("export/SM_Crate.fbx"),
                &store.snapshot(),
                "",
            )
            .unwrap();

        assert!(outcome.texture_warnings.is_empty());
        assert!(dir.path().join("tex/SM_Crate/crate_albedo.png").exists());

        // The sidecar round-trips as a settings document plus run fields
        let text = std::fs::read_to_string(&outcome.metadata_path).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["asset_name"], "SM_Crate");
        assert_eq!(doc["unreal_import_settings"]["combine_meshes"], true);
        assert_eq!(doc["metadata"]["custom_properties"]["lod_chain"], "3");
        assert_eq!(doc["metadata"]["tags"][1], "industrial");
        assert!(!doc["metadata"]["date_created"].as_str().unwrap().is_empty());
        assert_eq!(doc["artifact"]["size_bytes"].as_u64().unwrap(), 21);

        // The settings sections of the sidecar are themselves a valid
        // document: strip the run fields and deserialize
        let mut sections = doc.as_object().unwrap().clone();
        for run_field in [
            "date_created",
            "asset_name",
            "output_path",
            "texture_warnings",
            "texture_files",
            "session_id",
            "generator",
            "artifact",
        ] {
            sections.remove(run_field);
        }
        let restored =
            SettingsStore::deserialize(&Value::Object(sections).to_string()).unwrap();
        assert_eq!(
            restored.settings().metadata.author,
            store.settings().metadata.author
        );
    }

    #[test]
    fn precondition_failures_never_touch_the_host() {
        let dir = TempDir::new().unwrap();
        let pipeline = ExportPipeline::new(SessionHost { textures: vec![] });

        let mut store = SettingsStore::new();
        store.set("textures.copy_textures", json!(true)).unwrap();

        let err = pipeline
            .export_current_selection(
                &dir.path().join("a.fbx"),
                &store.snapshot(),
                "",
            )
            .unwrap_err();
        assert!(matches!(err, ExportError::TextureFolderRequired));
        assert!(!dir.path().join("a.fbx").exists());
    }
}
