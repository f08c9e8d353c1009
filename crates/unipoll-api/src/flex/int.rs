use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::{format_number, parse_lenient, serialize_number, shape_name};
use crate::error::Error;

/// A number that may arrive as a JSON number, a numeric string, or null.
///
/// `value` is the canonical number; `text` is exactly what the controller
/// sent (or the shortest rendering of the number when it sent a number).
/// Re-encoding always emits the number, never the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexInt {
    pub value: f64,
    pub text: String,
}

impl FlexInt {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            text: format_number(value),
        }
    }

    /// Decode from an already-parsed JSON value.
    ///
    /// Unparseable strings decode to 0 with the text preserved. Only
    /// objects, arrays, and booleans are rejected.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Number(n) => Ok(Self::new(n.as_f64().unwrap_or(0.0))),
            Value::String(s) => Ok(Self {
                value: parse_lenient(s),
                text: s.clone(),
            }),
            Value::Null => Ok(Self {
                value: 0.0,
                text: "0".into(),
            }),
            other => Err(Error::UnsupportedShape {
                target: "FlexInt",
                found: shape_name(other),
            }),
        }
    }

    /// Truncating integer view.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn as_i64(&self) -> i64 {
        self.value as i64
    }

    pub fn add(&mut self, other: &Self) {
        self.add_f64(other.value);
    }

    pub fn add_f64(&mut self, value: f64) {
        self.value += value;
        self.text = format_number(self.value);
    }
}

impl From<f64> for FlexInt {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FlexInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for FlexInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

impl Serialize for FlexInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(self.value, serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numbers() {
        let n: FlexInt = serde_json::from_value(json!(1234)).unwrap();
        assert!((n.value - 1234.0).abs() < f64::EPSILON);
        assert_eq!(n.text, "1234");

        let n: FlexInt = serde_json::from_value(json!(12.75)).unwrap();
        assert!((n.value - 12.75).abs() < f64::EPSILON);
        assert_eq!(n.text, "12.75");
    }

    #[test]
    fn decodes_numeric_strings_and_keeps_text() {
        let n: FlexInt = serde_json::from_value(json!("0042")).unwrap();
        assert!((n.value - 42.0).abs() < f64::EPSILON);
        assert_eq!(n.text, "0042");
    }

    #[test]
    fn garbled_string_is_zero_not_error() {
        let n: FlexInt = serde_json::from_value(json!("unknown")).unwrap();
        assert!(n.value.abs() < f64::EPSILON);
        assert_eq!(n.text, "unknown");

        let n: FlexInt = serde_json::from_value(json!("")).unwrap();
        assert!(n.value.abs() < f64::EPSILON);
        assert_eq!(n.text, "");
    }

    #[test]
    fn non_finite_strings_are_garbled() {
        for text in ["NaN", "inf", "-Infinity"] {
            let n: FlexInt = serde_json::from_value(json!(text)).unwrap();
            assert!(n.value.abs() < f64::EPSILON);
            assert_eq!(n.text, text);
            assert_eq!(serde_json::to_string(&n).unwrap(), "0");
        }
    }

    #[test]
    fn null_is_zero() {
        let n: FlexInt = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(n, FlexInt::new(0.0));
    }

    #[test]
    fn rejects_structural_shapes() {
        for bad in [json!({"a": 1}), json!([1, 2]), json!(true)] {
            let err = FlexInt::from_value(&bad).unwrap_err();
            assert!(matches!(err, Error::UnsupportedShape { target: "FlexInt", .. }));
            assert!(serde_json::from_value::<FlexInt>(bad).is_err());
        }
    }

    #[test]
    fn encodes_the_number_not_the_text() {
        let n: FlexInt = serde_json::from_value(json!("17")).unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "17");

        let n = FlexInt::new(2.5);
        assert_eq!(serde_json::to_string(&n).unwrap(), "2.5");
    }

    #[test]
    fn add_keeps_text_in_sync() {
        let mut total: FlexInt = serde_json::from_value(json!("10")).unwrap();
        total.add(&FlexInt::new(5.5));
        assert!((total.value - 15.5).abs() < f64::EPSILON);
        assert_eq!(total.text, "15.5");

        total.add_f64(-0.5);
        assert_eq!(total.to_string(), "15");
        assert_eq!(total.as_i64(), 15);
    }
}
