//! Basemap catalog and full map composition.

use std::path::Path;

use tracing::debug;

use crate::assembler::{assemble, AssemblyReport};
use crate::config::{MapConfig, MapView};
use crate::errors::{BoundaryError, BoundaryResult};
use crate::map::leaflet::LeafletMap;
use crate::map::surface::{MapSurface, TileLayer};

/// Optional overrides for a single map build.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapRequest {
    pub basemap: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct BasemapCatalog {
    config: MapConfig,
}

impl BasemapCatalog {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    pub fn default_view(&self) -> &MapView {
        &self.config.default_map_config
    }

    /// Basemap names in configured order.
    pub fn available_basemaps(&self) -> Vec<&str> {
        self.config.basemap_options.keys().map(String::as_str).collect()
    }

    /// `name` if it is a known basemap, otherwise the default basemap.
    pub fn validate_basemap<'a>(&'a self, name: &'a str) -> &'a str {
        if self.config.basemap_options.contains_key(name) {
            name
        } else {
            &self.config.default_map_config.basemap
        }
    }

    pub fn tile_layer(&self, name: &str, show: bool) -> BoundaryResult<TileLayer> {
        let url = self
            .config
            .basemap_options
            .get(name)
            .ok_or_else(|| BoundaryError::MapConfig(format!("Invalid basemap: {name}")))?;
        Ok(TileLayer {
            name: name.to_string(),
            url: url.clone(),
            attribution: self
                .config
                .basemap_attributions
                .get(name)
                .cloned()
                .unwrap_or_default(),
            show,
        })
    }

    /// Add `selected` first (shown), then every other basemap (hidden).
    pub fn add_all_basemap_layers(
        &self,
        surface: &mut dyn MapSurface,
        selected: &str,
    ) -> BoundaryResult<()> {
        surface.add_tile_layer(self.tile_layer(selected, true)?);
        for name in self.config.basemap_options.keys() {
            if name != selected {
                surface.add_tile_layer(self.tile_layer(name, false)?);
            }
        }
        Ok(())
    }

    /// Build a complete map: basemaps, boundary overlays from
    /// `boundary_dir`, and a layer control.
    pub fn create_map(
        &self,
        request: &MapRequest,
        boundary_dir: &Path,
    ) -> BoundaryResult<(LeafletMap, AssemblyReport)> {
        let view = self.default_view();
        let basemap = self.validate_basemap(request.basemap.as_deref().unwrap_or(&view.basemap));
        let mut map = LeafletMap::new(
            request.lat.unwrap_or(view.lat),
            request.lon.unwrap_or(view.lon),
            request.zoom.unwrap_or(view.zoom),
        );
        debug!("Creating map with basemap {} at {:?}", basemap, map.center);

        self.add_all_basemap_layers(&mut map, basemap)?;
        let report = assemble(boundary_dir, &mut map)?;
        map.add_layer_control();
        Ok((map, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_basemap_falls_back_to_default() {
        let catalog = BasemapCatalog::default();
        assert_eq!(catalog.validate_basemap("OpenTopoMap"), "OpenTopoMap");
        assert_eq!(catalog.validate_basemap("Bogus"), "OpenStreetMap");
    }

    #[test]
    fn selected_basemap_is_first_and_only_one_shown() {
        let catalog = BasemapCatalog::default();
        let mut map = LeafletMap::new(0.0, 0.0, 1);
        catalog.add_all_basemap_layers(&mut map, "OpenTopoMap").unwrap();
        let names: Vec<&str> = map.tiles.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["OpenTopoMap", "Esri Satellite", "OpenStreetMap"]);
        let shown: Vec<bool> = map.tiles.iter().map(|t| t.show).collect();
        assert_eq!(shown, vec![true, false, false]);
    }

    #[test]
    fn available_basemaps_follow_config_order() {
        assert_eq!(
            BasemapCatalog::default().available_basemaps(),
            vec!["Esri Satellite", "OpenStreetMap", "OpenTopoMap"]
        );
    }

    #[test]
    fn invalid_tile_layer_is_an_error() {
        assert!(BasemapCatalog::default().tile_layer("Bogus", true).is_err());
    }

    #[test]
    fn create_map_uses_defaults_and_boundaries() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("zones.geojson"),
            r#"{"type": "FeatureCollection", "features": []}"#,
        )
        .unwrap();

        let catalog = BasemapCatalog::default();
        let request = MapRequest {
            zoom: Some(9),
            ..Default::default()
        };
        let (map, report) = catalog.create_map(&request, tmp.path()).unwrap();
        assert_eq!(map.center, [39.8283, -98.5795]);
        assert_eq!(map.zoom, 9);
        assert_eq!(map.tiles[0].name, "OpenStreetMap");
        assert_eq!(map.overlay_names(), vec!["zones"]);
        assert!(map.layer_control);
        assert_eq!(report.attached(), 1);
    }
}
