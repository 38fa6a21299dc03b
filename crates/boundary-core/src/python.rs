//! PyO3 bindings exposing the boundary engine to the Python web layer.

use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::assembler::BoundaryAssembler;
use crate::config::{load_map_config, MapConfig};
use crate::discovery::list_boundary_files;
use crate::geometry::GeometrySource;
use crate::map::{BasemapCatalog, MapRequest};
use crate::metadata::resolve;
use crate::models::{self, BoundaryFile};
use crate::BoundaryError;

// ---------------------------------------------------------------------------
// BoundaryMeta
// ---------------------------------------------------------------------------

/// Python view of resolved boundary metadata. `style` is a JSON string.
#[pyclass(name = "BoundaryMeta", frozen, get_all)]
#[derive(Clone, Debug)]
pub struct PyBoundaryMeta {
    pub title: String,
    pub visible_default: bool,
    pub tooltip_fields: Vec<String>,
    pub tooltip_aliases: Vec<String>,
    pub popup_fields: Vec<String>,
    pub style: String,
}

impl From<models::BoundaryMeta> for PyBoundaryMeta {
    fn from(meta: models::BoundaryMeta) -> Self {
        Self {
            style: serde_json::Value::Object(meta.style.into_iter().collect()).to_string(),
            title: meta.title,
            visible_default: meta.visible_default,
            tooltip_fields: meta.tooltip_fields,
            tooltip_aliases: meta.tooltip_aliases,
            popup_fields: meta.popup_fields,
        }
    }
}

#[pymethods]
impl PyBoundaryMeta {
    fn __repr__(&self) -> String {
        format!(
            "BoundaryMeta(title={:?}, visible_default={}, tooltip_fields={:?}, popup_fields={:?})",
            self.title, self.visible_default, self.tooltip_fields, self.popup_fields,
        )
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

fn map_config(config_path: Option<PathBuf>) -> PyResult<MapConfig> {
    Ok(match config_path {
        Some(path) => load_map_config(&path)?,
        None => MapConfig::default(),
    })
}

/// Boundary file paths in `boundary_dir`, in layer order.
#[pyfunction]
#[pyo3(name = "list_boundary_files")]
pub fn list_boundary_paths(boundary_dir: PathBuf) -> PyResult<Vec<String>> {
    Ok(list_boundary_files(&boundary_dir)?
        .iter()
        .map(|f| f.path.to_string_lossy().into_owned())
        .collect())
}

/// Whether this build can read GeoPackage files.
#[pyfunction]
pub fn gpkg_supported() -> bool {
    GeometrySource::new().supports_gpkg()
}

/// Basemap names in configured order.
#[pyfunction]
#[pyo3(signature = (config_path=None))]
pub fn list_basemaps(config_path: Option<PathBuf>) -> PyResult<Vec<String>> {
    let catalog = BasemapCatalog::new(map_config(config_path)?);
    Ok(catalog
        .available_basemaps()
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Read `path` and resolve its display metadata.
#[pyfunction]
pub fn resolve_metadata(path: PathBuf) -> PyResult<PyBoundaryMeta> {
    let file = BoundaryFile::from_path(&path)
        .ok_or_else(|| BoundaryError::UnsupportedFormat(path.display().to_string()))?;
    let collection = GeometrySource::new().read(&file)?;
    Ok(resolve(&file, &collection).into())
}

/// JSON array of overlay layers built from `boundary_dir`.
#[pyfunction]
pub fn build_boundary_layers(boundary_dir: PathBuf) -> PyResult<String> {
    let (layers, _report) = BoundaryAssembler::default().build_all(&boundary_dir)?;
    Ok(serde_json::to_string(&layers).map_err(BoundaryError::from)?)
}

/// Render a complete Leaflet page with basemaps and boundary overlays.
#[pyfunction]
#[pyo3(signature = (boundary_dir, basemap=None, lat=None, lon=None, zoom=None, config_path=None))]
pub fn render_map(
    boundary_dir: PathBuf,
    basemap: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    zoom: Option<u8>,
    config_path: Option<PathBuf>,
) -> PyResult<String> {
    let config = map_config(config_path)?;
    let request = MapRequest {
        basemap,
        lat,
        lon,
        zoom,
    };
    let (map, _report) = BasemapCatalog::new(config).create_map(&request, &boundary_dir)?;
    Ok(map.to_html()?)
}

// ---------------------------------------------------------------------------
// Top-level Python module: _boundary_core
// ---------------------------------------------------------------------------

#[pymodule]
fn _boundary_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBoundaryMeta>()?;

    m.add(
        "EMBEDDED_META_KEY",
        crate::metadata::resolver::EMBEDDED_META_KEY,
    )?;

    m.add_function(wrap_pyfunction!(gpkg_supported, m)?)?;
    m.add_function(wrap_pyfunction!(list_basemaps, m)?)?;
    m.add_function(wrap_pyfunction!(list_boundary_paths, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_metadata, m)?)?;
    m.add_function(wrap_pyfunction!(build_boundary_layers, m)?)?;
    m.add_function(wrap_pyfunction!(render_map, m)?)?;

    Ok(())
}
