//! Basemap/map-view configuration file loading and validation.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{BoundaryError, BoundaryResult};

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

const BUILTIN_BASEMAPS: &[(&str, &str, &str)] = &[
    (
        "Esri Satellite",
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, \
         Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
    ),
    (
        "OpenStreetMap",
        "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        "&copy; <a href='https://www.openstreetmap.org/copyright'>OpenStreetMap</a> contributors",
    ),
    (
        "OpenTopoMap",
        "https://tile.opentopomap.org/{z}/{x}/{y}.png",
        "Map data: &copy; <a href='https://www.openstreetmap.org/copyright'>OpenStreetMap</a> \
         contributors, <a href='http://viewfinderpanorama.org'>SRTM</a> | Map style: &copy; \
         <a href='https://opentopomap.org'>OpenTopoMap</a> \
         (<a href='https://creativecommons.org/licenses/by-sa/3.0/'>CC-BY-SA</a>)",
    ),
];

// ---------------------------------------------------------------------------
// MapView / MapConfig
// ---------------------------------------------------------------------------

/// Initial view and basemap of a freshly built map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub basemap: String,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            lat: 39.8283,
            lon: -98.5795,
            zoom: 4,
            basemap: "OpenStreetMap".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Basemap name -> tile URL template, in listing order.
    #[serde(default)]
    pub basemap_options: IndexMap<String, String>,
    #[serde(default)]
    pub basemap_attributions: IndexMap<String, String>,
    #[serde(default)]
    pub default_map_config: MapView,
}

impl Default for MapConfig {
    fn default() -> Self {
        let mut basemap_options = IndexMap::new();
        let mut basemap_attributions = IndexMap::new();
        for (name, url, attribution) in BUILTIN_BASEMAPS {
            basemap_options.insert(name.to_string(), url.to_string());
            basemap_attributions.insert(name.to_string(), attribution.to_string());
        }
        Self {
            basemap_options,
            basemap_attributions,
            default_map_config: MapView::default(),
        }
    }
}

impl MapConfig {
    /// Every basemap needs an attribution and the default basemap must exist.
    pub fn validate(&self) -> BoundaryResult<()> {
        let missing: Vec<&str> = self
            .basemap_options
            .keys()
            .filter(|name| !self.basemap_attributions.contains_key(*name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(BoundaryError::MapConfig(format!(
                "Missing attributions for basemaps: {:?}",
                missing
            )));
        }
        let default = &self.default_map_config.basemap;
        if !self.basemap_options.contains_key(default) {
            return Err(BoundaryError::MapConfig(format!(
                "Default basemap '{}' not found in basemap_options",
                default
            )));
        }
        Ok(())
    }
}

/// Load and validate a map configuration JSON file.
pub fn load_map_config(path: &Path) -> BoundaryResult<MapConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: MapConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        let config = MapConfig::default();
        config.validate().unwrap();
        let names: Vec<&str> = config.basemap_options.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Esri Satellite", "OpenStreetMap", "OpenTopoMap"]);
    }

    #[test]
    fn loads_file_and_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("basemaps.json");
        std::fs::write(
            &path,
            r#"{
                "basemap_options": {"Zeta": "https://z/{z}/{x}/{y}", "Alpha": "https://a/{z}/{x}/{y}"},
                "basemap_attributions": {"Zeta": "z", "Alpha": "a"},
                "default_map_config": {"lat": 1.0, "lon": 2.0, "zoom": 7, "basemap": "Alpha"}
            }"#,
        )
        .unwrap();
        let config = load_map_config(&path).unwrap();
        let names: Vec<&str> = config.basemap_options.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(config.default_map_config.zoom, 7);
    }

    #[test]
    fn missing_attribution_is_rejected() {
        let mut config = MapConfig::default();
        config.basemap_attributions.shift_remove("OpenTopoMap");
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("OpenTopoMap"), "{err}");
    }

    #[test]
    fn unknown_default_basemap_is_rejected() {
        let mut config = MapConfig::default();
        config.default_map_config.basemap = "Nope".into();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Default basemap 'Nope'"), "{err}");
    }

    #[test]
    fn empty_file_fails_default_basemap_check() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(load_map_config(&path), Err(BoundaryError::MapConfig(_))));
    }
}
