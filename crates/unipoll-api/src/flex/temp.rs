use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::{format_number, parse_lenient, serialize_number, shape_name};
use crate::error::Error;

/// A temperature that may arrive as a number, `"41"`, or `"41 C"`.
///
/// `value` is in Celsius. A unit suffix is tolerated but not converted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexTemp {
    pub value: f64,
    pub text: String,
}

impl FlexTemp {
    pub fn new(celsius: f64) -> Self {
        Self {
            value: celsius,
            text: format_number(celsius),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Number(n) => Ok(Self::new(n.as_f64().unwrap_or(0.0))),
            Value::String(s) => {
                let number = match s.split_once(' ') {
                    Some((number, _unit)) => number,
                    None => s.as_str(),
                };
                Ok(Self {
                    value: parse_lenient(number),
                    text: s.clone(),
                })
            }
            Value::Null => Ok(Self {
                value: 0.0,
                text: "0".into(),
            }),
            other => Err(Error::UnsupportedShape {
                target: "FlexTemp",
                found: shape_name(other),
            }),
        }
    }

    pub fn celsius(&self) -> f64 {
        self.value
    }

    pub fn fahrenheit(&self) -> f64 {
        self.value * 9.0 / 5.0 + 32.0
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn celsius_rounded(&self) -> i64 {
        self.value.round() as i64
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn fahrenheit_rounded(&self) -> i64 {
        self.fahrenheit().round() as i64
    }

    pub fn add(&mut self, other: &Self) {
        self.add_f64(other.value);
    }

    pub fn add_f64(&mut self, celsius: f64) {
        self.value += celsius;
        self.text = format_number(self.value);
    }
}

impl fmt::Display for FlexTemp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for FlexTemp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

impl Serialize for FlexTemp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(self.value, serializer)
    }
}
