//! Leaflet-backed map surface rendering to a standalone HTML document.

use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::BoundaryResult;
use crate::layers::OverlayLayer;
use crate::map::surface::{MapSurface, TileLayer};

const LEAFLET_VERSION: &str = "1.9.4";

const MAP_SCRIPT: &str = r#"
const spec = JSON.parse(document.getElementById('map-spec').textContent);
const map = L.map('map', { center: spec.center, zoom: spec.zoom });
const esc = (v) => String(v ?? '').replace(/[&<>"']/g, (c) => ({
  '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#x27;'
}[c]));
const baseLayers = {};
spec.tiles.forEach((t) => {
  const layer = L.tileLayer(t.url, { attribution: t.attribution });
  baseLayers[t.name] = layer;
  if (t.show) layer.addTo(map);
});
const overlays = {};
spec.overlays.forEach((o) => {
  const group = L.featureGroup();
  const geo = L.geoJSON(o.data, {
    style: () => o.style,
    onEachFeature: (feature, layer) => {
      if (o.tooltip) {
        const rows = o.tooltip.fields.map((f, i) =>
          `<tr><th>${esc(o.tooltip.labels[i])}</th><td>${esc((feature.properties || {})[f])}</td></tr>`
        ).join('');
        layer.bindTooltip(`<table>${rows}</table>`, { sticky: o.tooltip.sticky });
      }
      if (o.popup && feature.popup) {
        layer.bindPopup(feature.popup, { maxWidth: o.popup.max_width });
      }
      layer.on('mouseover', () => layer.setStyle && layer.setStyle(o.highlight));
      layer.on('mouseout', () => geo.resetStyle(layer));
    },
  });
  geo.addTo(group);
  overlays[o.name] = group;
  if (o.show) group.addTo(map);
});
if (spec.layer_control) L.control.layers(baseLayers, overlays).addTo(map);
"#;

/// In-memory map composition rendered with Leaflet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeafletMap {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: Vec<TileLayer>,
    pub overlays: Vec<OverlayLayer>,
    pub layer_control: bool,
}

impl LeafletMap {
    pub fn new(lat: f64, lon: f64, zoom: u8) -> Self {
        Self {
            center: [lat, lon],
            zoom,
            tiles: vec![],
            overlays: vec![],
            layer_control: false,
        }
    }

    pub fn overlay_names(&self) -> Vec<&str> {
        self.overlays.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn to_json(&self) -> BoundaryResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Client payload: the composition with pre-rendered popup markup
    /// attached to each feature as a `popup` member.
    fn render_spec(&self) -> BoundaryResult<Value> {
        let mut overlays = Vec::with_capacity(self.overlays.len());
        for overlay in &self.overlays {
            let mut value = serde_json::to_value(overlay)?;
            if let Some(popups) = overlay.popup_contents() {
                if let Some(Value::Array(features)) = value["data"].get_mut("features") {
                    for (feature, html) in features.iter_mut().zip(popups) {
                        if !html.is_empty() {
                            feature["popup"] = Value::String(html);
                        }
                    }
                }
            }
            overlays.push(value);
        }
        Ok(json!({
            "center": self.center,
            "zoom": self.zoom,
            "tiles": self.tiles,
            "overlays": overlays,
            "layer_control": self.layer_control,
        }))
    }

    pub fn to_html(&self) -> BoundaryResult<String> {
        // "</" would terminate the embedding script element.
        let spec = serde_json::to_string(&self.render_spec()?)?.replace("</", "<\\/");
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script type="application/json" id="map-spec">{spec}</script>
<script>{script}</script>
</body>
</html>
"#,
            v = LEAFLET_VERSION,
            spec = spec,
            script = MAP_SCRIPT,
        ))
    }
}

impl MapSurface for LeafletMap {
    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tiles.push(layer);
    }

    fn add_overlay(&mut self, layer: OverlayLayer) {
        self.overlays.push(layer);
    }

    fn add_layer_control(&mut self) {
        self.layer_control = true;
    }
}
