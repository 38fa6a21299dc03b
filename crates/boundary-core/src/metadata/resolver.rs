//! Display metadata resolution for boundary files.
//!
//! Sources are checked in [`PRECEDENCE`] order and the first one that yields
//! an object is used exclusively; fields it omits fall back to defaults, not
//! to lower-precedence sources.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::discovery::SIDECAR_SUFFIX;
use crate::metadata::schema::{is_truthy, RawMetadata};
use crate::models::{BoundaryFile, BoundaryFormat, BoundaryMeta, FeatureCollection};

/// Reserved top-level GeoJSON key carrying embedded metadata.
pub const EMBEDDED_META_KEY: &str = "pymap";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataSource {
    Embedded,
    Sidecar,
}

pub const PRECEDENCE: [MetadataSource; 2] = [MetadataSource::Embedded, MetadataSource::Sidecar];

impl MetadataSource {
    /// The raw object this source provides for `file`, if any.
    pub fn lookup(self, file: &BoundaryFile, collection: &FeatureCollection) -> Option<Map<String, Value>> {
        match self {
            Self::Embedded => embedded_block(file, collection),
            Self::Sidecar => sidecar_block(file),
        }
    }
}

pub fn sidecar_path(file: &BoundaryFile) -> PathBuf {
    file.directory()
        .join(format!("{}{}", file.stem, SIDECAR_SUFFIX))
}

fn embedded_block(file: &BoundaryFile, collection: &FeatureCollection) -> Option<Map<String, Value>> {
    if file.format != BoundaryFormat::Geojson {
        return None;
    }
    match collection.foreign_members.get(EMBEDDED_META_KEY)? {
        Value::Object(obj) => Some(obj.clone()),
        _ => {
            warn!(
                "Ignoring non-object '{}' block in {}",
                EMBEDDED_META_KEY,
                file.file_name()
            );
            None
        }
    }
}

fn sidecar_block(file: &BoundaryFile) -> Option<Map<String, Value>> {
    let path = sidecar_path(file);
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(_) => {
            warn!("Ignoring sidecar {}: not a JSON object", path.display());
            None
        }
        Err(e) => {
            warn!("Ignoring sidecar {}: {}", path.display(), e);
            None
        }
    }
}

/// Normalise decoded metadata (or its absence) into a [`BoundaryMeta`].
pub fn normalize(raw: Option<&RawMetadata>, fallback_title: &str) -> BoundaryMeta {
    let Some(raw) = raw else {
        return BoundaryMeta::defaults(fallback_title);
    };
    let title = raw
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback_title)
        .to_string();
    let tooltip = raw.tooltip.clone().unwrap_or_default();
    BoundaryMeta {
        title,
        visible_default: raw.visible_default.as_ref().map_or(true, is_truthy),
        tooltip_fields: tooltip.fields.unwrap_or_default(),
        tooltip_aliases: tooltip.aliases.unwrap_or_default(),
        popup_fields: raw
            .popup
            .as_ref()
            .and_then(|p| p.fields.clone())
            .unwrap_or_default(),
        style: raw.style.clone().unwrap_or_default(),
    }
}

/// Resolve display metadata for `file`. Never fails; malformed blocks
/// degrade to defaults.
pub fn resolve(file: &BoundaryFile, collection: &FeatureCollection) -> BoundaryMeta {
    let selected = PRECEDENCE
        .iter()
        .find_map(|source| source.lookup(file, collection).map(|obj| (*source, obj)));

    let raw = selected.and_then(|(source, obj)| {
        match serde_json::from_value::<RawMetadata>(Value::Object(obj)) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(
                    "Malformed {:?} metadata for {}; using defaults: {}",
                    source,
                    file.file_name(),
                    e
                );
                None
            }
        }
    });

    let meta = normalize(raw.as_ref(), &file.stem);
    debug!(
        "Metadata for {}: title={}, tooltip_fields={:?}, popup_fields={:?}",
        file.file_name(),
        meta.title,
        meta.tooltip_fields,
        meta.popup_fields
    );
    meta
}
