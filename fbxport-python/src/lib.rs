//! Python bindings for fbxport
//!
//! The original export tooling lives inside the DCC's Python environment, so
//! these bindings expose the two surfaces that environment needs:
//!
//! - [`PySettingsStore`]: the mutable settings document, with `serialize()`
//!   driving the UI's live JSON preview
//! - [`export_fbx`]: the full pipeline, with the host primitives supplied as
//!   Python callables (`maya.cmds` stays on the Python side)
//!
//! Host callables are only ever invoked on the calling thread, so plain
//! functions closing over the DCC session are safe to pass in.

use fbxport_core::{
    export_fbx as run_export, HostEnvironment, HostExportOptions, SceneObject, SettingsStore,
    TextureRef,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::Path;
use tracing::warn;

/// Python wrapper around the settings store
#[pyclass(name = "SettingsStore")]
pub struct PySettingsStore {
    inner: SettingsStore,
}

#[pymethods]
impl PySettingsStore {
    #[new]
    fn new() -> Self {
        Self {
            inner: SettingsStore::new(),
        }
    }

    /// Update one leaf, e.g. `set("transform.rotation.1", "90")`.
    /// The value is a JSON literal.
    fn set(&mut self, path: &str, value_json: &str) -> PyResult<()> {
        let value = serde_json::from_str(value_json)
            .map_err(|e| PyValueError::new_err(format!("value is not valid JSON: {}", e)))?;
        self.inner
            .set(path, value)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Apply a partial document (JSON text) on top of the current one
    fn merge(&mut self, partial_json: &str) -> PyResult<()> {
        let partial = serde_json::from_str(partial_json)
            .map_err(|e| PyValueError::new_err(format!("partial is not valid JSON: {}", e)))?;
        self.inner
            .merge(&partial)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Restore every section to its schema default
    fn reset(&mut self) {
        self.inner.reset();
    }

    /// Canonical JSON text of the document; what the UI previews
    fn serialize(&self) -> String {
        self.inner.serialize()
    }

    /// Build a store from serialized text
    #[staticmethod]
    fn deserialize(text: &str) -> PyResult<Self> {
        SettingsStore::deserialize(text)
            .map(|inner| Self { inner })
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __str__(&self) -> String {
        self.inner.serialize()
    }
}

/// Result of a completed export run
#[pyclass(name = "ExportOutcome")]
pub struct PyExportOutcome {
    #[pyo3(get)]
    pub output_path: String,
    #[pyo3(get)]
    pub metadata_path: String,
    #[pyo3(get)]
    pub texture_warnings: Vec<String>,
    #[pyo3(get)]
    pub duration_ms: u64,
}

#[pymethods]
impl PyExportOutcome {
    fn __repr__(&self) -> String {
        format!(
            "ExportOutcome(output_path='{}', warnings={})",
            self.output_path,
            self.texture_warnings.len()
        )
    }
}

/// Host environment whose primitives are Python callables
struct CallbackHost {
    export_mesh: PyObject,
    enumerate_textures: Option<PyObject>,
}

impl HostEnvironment for CallbackHost {
    fn current_selection(&self) -> Vec<SceneObject> {
        // Selection is passed explicitly through export_fbx
        Vec::new()
    }

    fn export_mesh(
        &self,
        objects: &[SceneObject],
        target_path: &Path,
        options: &HostExportOptions,
    ) -> anyhow::Result<()> {
        Python::with_gil(|py| {
            let names: Vec<&str> = objects.iter().map(|o| o.name()).collect();
            self.export_mesh
                .call1(
                    py,
                    (
                        names,
                        target_path.to_string_lossy().into_owned(),
                        options.to_option_string(),
                    ),
                )
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!("export callback raised: {}", e))
        })
    }

    fn enumerate_textures(&self, objects: &[SceneObject]) -> Vec<TextureRef> {
        let Some(callback) = &self.enumerate_textures else {
            return Vec::new();
        };
        Python::with_gil(|py| {
            let names: Vec<&str> = objects.iter().map(|o| o.name()).collect();
            let pairs = callback
                .call1(py, (names,))
                .and_then(|result| result.extract::<Vec<(String, String)>>(py));
            match pairs {
                Ok(pairs) => pairs
                    .into_iter()
                    .map(|(material, path)| TextureRef {
                        material,
                        path: path.into(),
                    })
                    .collect(),
                Err(e) => {
                    // Enumeration failures degrade to "no textures"; the
                    // mesh artifact still ships
                    warn!("texture enumeration callback raised: {}", e);
                    Vec::new()
                }
            }
        })
    }
}

/// Run a full export.
///
/// `export_mesh(objects, path, options)` is required and must perform the
/// host's mesh export. `enumerate_textures(objects)` returns
/// `[(material, texture_path), ...]` and may be omitted when texture
/// handling is disabled.
#[pyfunction]
#[pyo3(signature = (selection, target_path, settings, export_mesh, enumerate_textures = None, asset_name = ""))]
fn export_fbx(
    selection: Vec<String>,
    target_path: &str,
    settings: &PySettingsStore,
    export_mesh: PyObject,
    enumerate_textures: Option<PyObject>,
    asset_name: &str,
) -> PyResult<PyExportOutcome> {
    let host = CallbackHost {
        export_mesh,
        enumerate_textures,
    };
    let objects: Vec<SceneObject> = selection.into_iter().map(SceneObject::new).collect();

    let outcome = run_export(
        &host,
        &objects,
        Path::new(target_path),
        settings.inner.settings(),
        asset_name,
    )
    .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

    Ok(PyExportOutcome {
        output_path: outcome.output_path.to_string_lossy().into_owned(),
        metadata_path: outcome.metadata_path.to_string_lossy().into_owned(),
        texture_warnings: outcome.texture_warnings,
        duration_ms: outcome.duration_ms,
    })
}

/// Python module definition
#[pymodule]
fn fbxport(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PySettingsStore>()?;
    m.add_class::<PyExportOutcome>()?;
    m.add_function(wrap_pyfunction!(export_fbx, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
