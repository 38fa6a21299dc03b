//! Native GeoJSON reading.

use std::path::Path;

use serde_json::Value;

use crate::errors::{BoundaryError, BoundaryResult};
use crate::models::{Feature, FeatureCollection};

pub fn read_geojson(path: &Path) -> BoundaryResult<FeatureCollection> {
    let text = std::fs::read_to_string(path)?;
    parse_geojson(&text)
}

/// Parse a GeoJSON document into a feature collection.
///
/// A lone `Feature` is wrapped into a one-feature collection. Top-level keys
/// other than `type` and `features` are kept as foreign members.
pub fn parse_geojson(text: &str) -> BoundaryResult<FeatureCollection> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut object) = value else {
        return Err(BoundaryError::Parse(
            "top-level GeoJSON value is not an object".to_string(),
        ));
    };

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);
    match kind.as_deref() {
        Some("FeatureCollection") => {
            let features: Vec<Feature> = match object.remove("features") {
                Some(Value::Null) | None => vec![],
                Some(v) => serde_json::from_value(v)?,
            };
            object.remove("type");
            Ok(FeatureCollection {
                features,
                foreign_members: object.into_iter().collect(),
            })
        }
        Some("Feature") => {
            let feature: Feature = serde_json::from_value(Value::Object(object))?;
            Ok(FeatureCollection {
                features: vec![feature],
                ..Default::default()
            })
        }
        other => Err(BoundaryError::Parse(format!(
            "expected a FeatureCollection, found type {:?}",
            other.unwrap_or("<missing>")
        ))),
    }
}
