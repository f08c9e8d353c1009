// Dual-shape record decoding
//
// Older controllers nest some records under an envelope key
// (`{"ap": {...}}`); newer ones flatten the same fields to the top level.
// Both shapes decode into one target type. The nested shape is always
// tried first: a type whose fields are all optional would otherwise
// "succeed" on the nested body with every field missing.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Decode `body` as `{key: T}`, falling back to `T` at the top level.
///
/// If both attempts fail, the error from the flat attempt is returned.
pub fn decode_dual<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<T, Error> {
    let value: Value = serde_json::from_slice(body).map_err(|e| deserialization(&e, body))?;
    from_value_dual(value, key).map_err(|e| deserialization(&e, body))
}

/// Same as [`decode_dual`] for an already-parsed value.
pub fn from_value_dual<T: DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<T, serde_json::Error> {
    if let Some(inner) = value.get(key) {
        if let Ok(record) = T::deserialize(inner) {
            return Ok(record);
        }
    }
    serde_json::from_value(value)
}

/// Decode `body` as a single record, preserving the body on failure.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| deserialization(&e, body))
}

pub(crate) fn deserialization(err: &serde_json::Error, body: &[u8]) -> Error {
    let body = String::from_utf8_lossy(body).into_owned();
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flex::{FlexBool, FlexInt};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Radio {
        bytes: FlexInt,
        #[serde(default)]
        enabled: FlexBool,
    }

    #[test]
    fn nested_and_flat_decode_identically() {
        let nested: Radio = decode_dual(br#"{"ap": {"bytes": 10, "enabled": "yes"}}"#, "ap").unwrap();
        let flat: Radio = decode_dual(br#"{"bytes": "10", "enabled": true}"#, "ap").unwrap();

        assert!((nested.bytes.value - 10.0).abs() < f64::EPSILON);
        assert!((flat.bytes.value - 10.0).abs() < f64::EPSILON);
        assert_eq!(nested.enabled.value, flat.enabled.value);
    }

    #[test]
    fn falls_back_when_nested_value_does_not_fit() {
        // `ap` is present but is a plain field of the flat record.
        #[derive(Debug, Deserialize)]
        struct Uplink {
            ap: String,
            speed: FlexInt,
        }

        let up: Uplink = decode_dual(br#"{"ap": "uplink-1", "speed": 1000}"#, "ap").unwrap();
        assert_eq!(up.ap, "uplink-1");
        assert_eq!(up.speed.as_i64(), 1000);
    }

    #[test]
    fn nested_is_preferred_over_flat() {
        #[derive(Debug, Deserialize, Default)]
        struct Loose {
            #[serde(default)]
            bytes: Option<FlexInt>,
        }

        let loose: Loose = decode_dual(br#"{"ap": {"bytes": 7}}"#, "ap").unwrap();
        assert_eq!(loose.bytes.unwrap().as_i64(), 7);
    }

    #[test]
    fn double_failure_reports_flat_attempt() {
        let err = decode_dual::<Radio>(br#"{"ap": {"nope": 1}}"#, "ap").unwrap_err();
        match err {
            Error::Deserialization { message, body } => {
                assert!(message.contains("missing field `bytes`"), "{message}");
                assert!(body.contains("nope"));
            }
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_a_deserialization_error() {
        let err = decode_dual::<Radio>(b"<html>", "ap").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
