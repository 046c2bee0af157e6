//! Scene manifest for headless batch export
//!
//! Outside a live DCC session there is no scene graph to query, so batch
//! runs describe the exportable scene in a small JSON manifest: the objects
//! to select and the texture files their materials reference. The manifest
//! plays the role of the host's selection and texture-enumeration
//! primitives; the export primitive itself is an external command (see
//! `host_bridge`).

use anyhow::{Context, Result};
use fbxport_core::{SceneObject, TextureRef};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A scene described on disk instead of in a DCC session
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneManifest {
    pub objects: Vec<ManifestObject>,
}

/// One exportable object and the textures its materials reference
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestObject {
    pub name: String,
    #[serde(default)]
    pub textures: Vec<ManifestTexture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestTexture {
    pub material: String,
    pub path: PathBuf,
}

impl SceneManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene manifest '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("malformed scene manifest '{}'", path.display()))
    }

    /// Every object in manifest order; the batch equivalent of the host's
    /// current selection
    pub fn selection(&self) -> Vec<SceneObject> {
        self.objects
            .iter()
            .map(|o| SceneObject::new(o.name.clone()))
            .collect()
    }

    /// Texture references for the given objects, in manifest order
    pub fn textures_for(&self, objects: &[SceneObject]) -> Vec<TextureRef> {
        let wanted: HashSet<&str> = objects.iter().map(|o| o.name()).collect();
        self.objects
            .iter()
            .filter(|o| wanted.contains(o.name.as_str()))
            .flat_map(|o| o.textures.iter())
            .map(|t| TextureRef {
                material: t.material.clone(),
                path: t.path.clone(),
            })
            .collect()
    }
}
