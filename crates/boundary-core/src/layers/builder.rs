//! Turning a feature collection and its metadata into an overlay layer.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::layers::style::{HighlightStyle, ResolvedStyle};
use crate::models::{BoundaryMeta, FeatureCollection};

/// Popup width cap in pixels.
pub const POPUP_MAX_WIDTH: u32 = 300;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TooltipSpec {
    pub fields: Vec<String>,
    /// One label per field; the field name where no alias was given.
    pub labels: Vec<String>,
    pub sticky: bool,
}

impl TooltipSpec {
    pub fn new(fields: Vec<String>, aliases: &[String]) -> Self {
        let labels = fields
            .iter()
            .enumerate()
            .map(|(i, field)| aliases.get(i).unwrap_or(field).clone())
            .collect();
        Self {
            fields,
            labels,
            sticky: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopupSpec {
    pub fields: Vec<String>,
    pub max_width: u32,
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl PopupSpec {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            max_width: POPUP_MAX_WIDTH,
        }
    }

    /// Label/value table for one feature. Fields the feature lacks are
    /// skipped; if none are present the result is empty.
    pub fn render(&self, properties: &IndexMap<String, Value>) -> String {
        let rows: String = self
            .fields
            .iter()
            .filter_map(|field| {
                properties.get(field).map(|value| {
                    format!(
                        "<tr><th style='text-align:left;padding-right:8px'>{}</th><td>{}</td></tr>",
                        escape_html(field),
                        escape_html(&display_value(value))
                    )
                })
            })
            .collect();
        if rows.is_empty() {
            String::new()
        } else {
            format!("<table>{rows}</table>")
        }
    }
}

/// A named, toggleable overlay group holding one styled geometry layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub name: String,
    pub show: bool,
    pub data: FeatureCollection,
    pub style: ResolvedStyle,
    pub highlight: HighlightStyle,
    pub tooltip: Option<TooltipSpec>,
    pub popup: Option<PopupSpec>,
}

impl OverlayLayer {
    /// Popup markup per feature, in feature order.
    pub fn popup_contents(&self) -> Option<Vec<String>> {
        let popup = self.popup.as_ref()?;
        Some(
            self.data
                .features
                .iter()
                .map(|f| popup.render(&f.properties))
                .collect(),
        )
    }
}

pub fn build_layer(collection: FeatureCollection, meta: BoundaryMeta) -> OverlayLayer {
    let style = ResolvedStyle::resolve(&meta.style);
    let tooltip = (!meta.tooltip_fields.is_empty())
        .then(|| TooltipSpec::new(meta.tooltip_fields, &meta.tooltip_aliases));
    let popup = (!meta.popup_fields.is_empty()).then(|| PopupSpec::new(meta.popup_fields));
    OverlayLayer {
        name: meta.title,
        show: meta.visible_default,
        data: collection,
        style,
        highlight: HighlightStyle::default(),
        tooltip,
        popup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geojson::parse_geojson;
    use serde_json::json;

    fn collection() -> FeatureCollection {
        parse_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": null, "properties": {"NAME": "Ada", "POP": 7, "X": null}},
                {"type": "Feature", "geometry": null, "properties": {"OTHER": "<b>"}}
            ]}"#,
        )
        .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_meta_builds_plain_layer() {
        let fc = collection();
        let layer = build_layer(fc.clone(), BoundaryMeta::defaults("plain"));
        assert_eq!(layer.name, "plain");
        assert!(layer.show);
        assert!(layer.tooltip.is_none());
        assert!(layer.popup.is_none());
        assert_eq!(layer.style, ResolvedStyle::default());
        assert_eq!(layer.highlight.weight, 3);
        // Round trip keeps features and property keys.
        assert_eq!(layer.data, fc);
    }

    #[test]
    fn tooltip_labels_pad_with_field_names() {
        let tip = TooltipSpec::new(strings(&["NAME", "POP", "AREA"]), &strings(&["Name"]));
        assert_eq!(tip.labels, strings(&["Name", "POP", "AREA"]));
        assert!(tip.sticky);

        let tip = TooltipSpec::new(strings(&["NAME"]), &strings(&["Name", "Extra"]));
        assert_eq!(tip.labels, strings(&["Name"]));
    }

    #[test]
    fn popup_skips_missing_fields() {
        let fc = collection();
        let popup = PopupSpec::new(strings(&["NAME", "MISSING", "POP"]));
        assert_eq!(
            popup.render(&fc.features[0].properties),
            "<table><tr><th style='text-align:left;padding-right:8px'>NAME</th><td>Ada</td></tr>\
             <tr><th style='text-align:left;padding-right:8px'>POP</th><td>7</td></tr></table>"
        );
        assert_eq!(popup.render(&fc.features[1].properties), "");
        assert_eq!(popup.max_width, 300);
    }

    #[test]
    fn popup_escapes_values() {
        let fc = collection();
        let popup = PopupSpec::new(strings(&["OTHER"]));
        assert!(popup.render(&fc.features[1].properties).contains("<td>&lt;b&gt;</td>"));
    }

    #[test]
    fn meta_drives_group_and_behaviour() {
        let meta = BoundaryMeta {
            title: "Counties".into(),
            visible_default: false,
            tooltip_fields: strings(&["NAME"]),
            tooltip_aliases: vec![],
            popup_fields: strings(&["NAME", "POP"]),
            style: serde_json::from_value(json!({"weight": 0})).unwrap(),
        };
        let layer = build_layer(collection(), meta);
        assert_eq!(layer.name, "Counties");
        assert!(!layer.show);
        assert_eq!(layer.tooltip.as_ref().unwrap().labels, strings(&["NAME"]));
        assert_eq!(layer.style.weight, 0);
        let popups = layer.popup_contents().unwrap();
        assert_eq!(popups.len(), 2);
        assert!(popups[1].is_empty());
    }
}
