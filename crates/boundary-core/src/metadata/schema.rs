//! Decoded shape of an embedded or sidecar metadata block.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Optional-field view of a metadata object. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,
    /// Interpreted by truthiness, so any JSON value is accepted. An explicit
    /// `null` is kept as `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub visible_default: Option<Value>,
    #[serde(default)]
    pub tooltip: Option<RawTooltip>,
    #[serde(default)]
    pub popup: Option<RawPopup>,
    #[serde(default)]
    pub style: Option<IndexMap<String, Value>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawTooltip {
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawPopup {
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

/// `Some` for any value that is present, `null` included.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// JSON truthiness: `false`, `null`, zero, and empty strings/arrays/objects
/// are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_block() {
        let raw: RawMetadata = serde_json::from_value(json!({
            "title": "Counties",
            "visible_default": false,
            "tooltip": {"fields": ["NAME", "POP"], "aliases": ["Name"]},
            "popup": {"fields": ["NAME"]},
            "style": {"color": "#f00", "weight": 0},
            "extra": "ignored"
        }))
        .unwrap();
        assert_eq!(raw.title.as_deref(), Some("Counties"));
        assert_eq!(raw.tooltip.unwrap().aliases.unwrap(), vec!["Name"]);
        assert_eq!(raw.style.unwrap()["weight"], 0);
    }

    #[test]
    fn explicit_null_visible_default_is_kept() {
        let raw: RawMetadata = serde_json::from_value(json!({"visible_default": null})).unwrap();
        assert_eq!(raw.visible_default, Some(Value::Null));
        let raw: RawMetadata = serde_json::from_value(json!({"title": "t"})).unwrap();
        assert_eq!(raw.visible_default, None);
    }

    #[test]
    fn wrong_types_fail_to_decode() {
        assert!(serde_json::from_value::<RawMetadata>(json!({"title": 5})).is_err());
        assert!(
            serde_json::from_value::<RawMetadata>(json!({"tooltip": {"fields": "NAME"}})).is_err()
        );
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(false), json!(null), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!("no"), json!([0]), json!({"a": 1})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }
}
