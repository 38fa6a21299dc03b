//! Fixed per-layer style resolution.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::metadata::schema::is_truthy;

pub const DEFAULT_COLOR: &str = "#444";
pub const DEFAULT_WEIGHT: f64 = 1.0;
pub const DEFAULT_FILL_OPACITY: f64 = 0.2;
pub const DEFAULT_DASH_ARRAY: &str = "3";

/// Stroke weight applied while a feature is hovered.
pub const HIGHLIGHT_WEIGHT: u32 = 3;

/// Style applied identically to every feature of a layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub color: Value,
    pub weight: Value,
    pub fill: bool,
    pub fill_color: Value,
    pub fill_opacity: Value,
    pub dash_array: Value,
}

impl ResolvedStyle {
    /// Resolve against defaults. A key that is present always wins, even
    /// when its value is falsy.
    pub fn resolve(style: &IndexMap<String, Value>) -> Self {
        let get = |key: &str, default: Value| style.get(key).cloned().unwrap_or(default);
        let color = get("color", Value::from(DEFAULT_COLOR));
        Self {
            fill_color: get("fillColor", color.clone()),
            color,
            weight: get("weight", Value::from(DEFAULT_WEIGHT)),
            fill: style.get("fill").is_some_and(is_truthy),
            fill_opacity: get("fillOpacity", Value::from(DEFAULT_FILL_OPACITY)),
            dash_array: get("dashArray", Value::from(DEFAULT_DASH_ARRAY)),
        }
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self::resolve(&IndexMap::new())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HighlightStyle {
    pub weight: u32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            weight: HIGHLIGHT_WEIGHT,
        }
    }
}
