//! Shared typed models used across discovery, geometry, metadata, and layer
//! construction.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// 1. BoundaryFormat
// ---------------------------------------------------------------------------

/// Source format of a boundary file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryFormat {
    Geojson,
    Gpkg,
}

impl BoundaryFormat {
    /// Map a file extension (without the dot, any case) to a format tag.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "geojson" | "json" => Some(Self::Geojson),
            "gpkg" => Some(Self::Gpkg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geojson => "geojson",
            Self::Gpkg => "gpkg",
        }
    }
}

impl fmt::Display for BoundaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// 2. BoundaryFile
// ---------------------------------------------------------------------------

/// A discovered boundary input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryFile {
    pub path: PathBuf,
    pub stem: String,
    pub format: BoundaryFormat,
}

impl BoundaryFile {
    /// Build a record from a path, or `None` if the extension is not a
    /// recognised boundary format.
    pub fn from_path(path: &Path) -> Option<Self> {
        let format = BoundaryFormat::from_extension(&path.extension()?.to_string_lossy())?;
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self {
            path: path.to_path_buf(),
            stem,
            format,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory holding this file (and any `<stem>.meta.json` sidecar).
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

// ---------------------------------------------------------------------------
// 3. Feature / FeatureCollection
// ---------------------------------------------------------------------------

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single GeoJSON feature. `geometry` is kept as GeoJSON geometry JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: IndexMap<String, Value>,
}

/// Canonical in-memory geometry representation.
///
/// Coordinates are always longitude/latitude once a collection leaves
/// `geometry::source`. Foreign top-level members of a GeoJSON document are
/// retained for metadata lookup but never serialised.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    #[serde(skip)]
    pub foreign_members: IndexMap<String, Value>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// ---------------------------------------------------------------------------
// 4. BoundaryMeta
// ---------------------------------------------------------------------------

/// Normalised display metadata for one boundary layer.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryMeta {
    /// Layer-control name; never empty.
    pub title: String,
    pub visible_default: bool,
    pub tooltip_fields: Vec<String>,
    /// Labels aligned by index with `tooltip_fields`; may be shorter.
    pub tooltip_aliases: Vec<String>,
    pub popup_fields: Vec<String>,
    pub style: IndexMap<String, Value>,
}

impl BoundaryMeta {
    /// Metadata used when no source supplies anything.
    pub fn defaults(fallback_title: &str) -> Self {
        Self {
            title: fallback_title.to_string(),
            visible_default: true,
            tooltip_fields: vec![],
            tooltip_aliases: vec![],
            popup_fields: vec![],
            style: IndexMap::new(),
        }
    }
}
