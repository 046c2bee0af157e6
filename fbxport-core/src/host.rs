//! Host environment seam
//!
//! The external 3D authoring application is reached only through
//! [`HostEnvironment`]: a selection query, a mesh/material export primitive,
//! and a texture enumeration for selected objects. Everything behind the
//! trait (scene graph, FBX writer, shading networks) is the host's business.
//!
//! All trait methods are invoked on the orchestrating thread, so
//! implementations bridging into single-threaded hosts (a DCC session, a
//! Python interpreter) do not need internal synchronization.

use crate::options::HostExportOptions;
use anyhow::Result;
use std::path::Path;

/// Opaque handle to a selected scene object (typically a node path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneObject(pub String);

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A texture file referenced by a material on a selected object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    /// Material (shader) the texture is wired into
    pub material: String,
    /// Source texture file on disk
    pub path: std::path::PathBuf,
}

/// The external 3D authoring application, reduced to the three primitives
/// the export pipeline needs.
pub trait HostEnvironment {
    /// Current ordered selection. An empty selection is a valid, expected
    /// response; the orchestrator turns it into `NoSelection`.
    fn current_selection(&self) -> Vec<SceneObject>;

    /// Export the given objects as a mesh/material binary at `target_path`
    /// under the mapped options. The written artifact is opaque to the
    /// pipeline.
    fn export_mesh(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> Result<()>;

    /// Ordered (material, texture file) pairs referenced by materials on the
    /// given objects. May be empty; never called unless texture export or
    /// copying was requested.
    fn enumerate_textures(&self, objects: &[SceneObject]) -> Vec<TextureRef>;
}

impl<H: HostEnvironment + ?Sized> HostEnvironment for &H {
    fn current_selection(&self) -> Vec<SceneObject> {
        (**self).current_selection()
    }

    fn export_mesh(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> Result<()> {
        (**self).export_mesh(objects, target_path, options)
    }

    fn enumerate_textures(&self, objects: &[SceneObject]) -> Vec<TextureRef> {
        (**self).enumerate_textures(objects)
    }
}
