use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::shape_name;
use crate::error::Error;

/// A field that is sometimes a string and sometimes an array of strings.
///
/// `value` is always the `", "`-joined rendering so display code can use
/// it directly; `is_array` remembers which shape to emit on re-encode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexString {
    pub value: String,
    pub items: Vec<String>,
    pub is_array: bool,
}

impl FlexString {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            items: vec![value.clone()],
            value,
            is_array: false,
        }
    }

    pub fn from_items(items: Vec<String>) -> Self {
        Self {
            value: items.join(", "),
            items,
            is_array: true,
        }
    }

    /// Decode from an already-parsed JSON value. Non-string array
    /// elements are dropped; null leaves everything empty.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Array(elements) => Ok(Self::from_items(
                elements
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            )),
            Value::String(s) => Ok(Self::new(s.as_str())),
            Value::Null => Ok(Self::default()),
            other => Err(Error::UnsupportedShape {
                target: "FlexString",
                found: shape_name(other),
            }),
        }
    }
}

impl fmt::Display for FlexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for FlexString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

impl Serialize for FlexString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_array {
            self.items.serialize(serializer)
        } else {
            serializer.serialize_str(&self.value)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_joins_and_reencodes_as_array() {
        let s: FlexString = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(s.value, "a, b");
        assert!(s.is_array);
        assert_eq!(s.items, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn non_string_elements_are_dropped() {
        let s: FlexString = serde_json::from_value(json!(["eth0", 4, null, "eth1"])).unwrap();
        assert_eq!(s.items, vec!["eth0".to_owned(), "eth1".to_owned()]);
        assert_eq!(s.value, "eth0, eth1");
    }

    #[test]
    fn scalar_stays_scalar() {
        let s: FlexString = serde_json::from_value(json!("wan")).unwrap();
        assert!(!s.is_array);
        assert_eq!(s.items, vec!["wan".to_owned()]);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!("wan"));
        assert_eq!(s.to_string(), "wan");
    }

    #[test]
    fn null_is_empty() {
        let s: FlexString = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(s, FlexString::default());
        assert_eq!(s.value, "");
    }

    #[test]
    fn rejects_objects_and_scalars_of_other_types() {
        for bad in [json!({"k": "v"}), json!(3), json!(false)] {
            assert!(matches!(
                FlexString::from_value(&bad),
                Err(Error::UnsupportedShape {
                    target: "FlexString",
                    ..
                })
            ));
        }
    }
}
