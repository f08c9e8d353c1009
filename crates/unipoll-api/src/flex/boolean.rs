use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Tokens the controller uses for "on". Matched case-insensitively;
/// everything else, including unknown words, is `false`.
const TRUTHY: [&str; 10] = [
    "1", "true", "yes", "t", "armed", "active", "enabled", "ready", "up", "ok",
];

/// A boolean that may arrive as `true`, `"yes"`, `"enabled"`, `1`, `"armed"`...
///
/// Decoding never fails: the raw token is kept in `text` and `value` is
/// true only for the fixed allow-list above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexBool {
    pub value: bool,
    pub text: String,
}

impl FlexBool {
    pub fn new(value: bool) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }

    /// Decode from an already-parsed JSON value. Strings contribute their
    /// contents, every other shape its JSON text.
    pub fn from_value(value: &Value) -> Self {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::from_token(text)
    }

    pub fn from_token(text: impl Into<String>) -> Self {
        let text = text.into();
        let value = TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(&text));
        Self { value, text }
    }

    pub fn as_f64(&self) -> f64 {
        if self.value { 1.0 } else { 0.0 }
    }
}

impl From<bool> for FlexBool {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FlexBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for FlexBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl Serialize for FlexBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> FlexBool {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn truth_table() {
        for word in [
            "1", "true", "yes", "t", "armed", "active", "enabled", "ready", "up", "ok",
        ] {
            assert!(decode(json!(word)).value, "{word} should be true");
        }
        for word in ["0", "false", "no", "disarmed", "inactive", "maybe", "", "down"] {
            assert!(!decode(json!(word)).value, "{word} should be false");
        }
    }

    #[test]
    fn matching_ignores_case() {
        assert!(decode(json!("YES")).value);
        assert!(decode(json!("Enabled")).value);
        assert!(decode(json!("OK")).value);
    }

    #[test]
    fn raw_tokens_use_their_json_text() {
        let b = decode(json!(true));
        assert!(b.value);
        assert_eq!(b.text, "true");

        let b = decode(json!(1));
        assert!(b.value);
        assert_eq!(b.text, "1");

        let b = decode(json!(0));
        assert!(!b.value);

        let b = decode(Value::Null);
        assert!(!b.value);
        assert_eq!(b.text, "null");
    }

    #[test]
    fn never_fails_on_structures() {
        assert!(!decode(json!({"up": true})).value);
        assert!(!decode(json!(["yes"])).value);
    }

    #[test]
    fn encodes_as_json_boolean() {
        assert_eq!(serde_json::to_string(&decode(json!("armed"))).unwrap(), "true");
        assert_eq!(serde_json::to_string(&decode(json!("disarmed"))).unwrap(), "false");
        assert!((FlexBool::new(true).as_f64() - 1.0).abs() < f64::EPSILON);
        assert_eq!(decode(json!("Ready")).to_string(), "Ready");
    }
}
