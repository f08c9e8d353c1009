// Flexible scalar codecs
//
// The controller emits the same logical field as a number, a numeric
// string, a boolean word, or null depending on firmware. Each type here
// decodes the union of observed shapes into one canonical value and keeps
// the original text next to it. Decoding goes through `serde_json::Value`
// and an explicit match on its shape, so every type also works as a plain
// field in any `#[derive(Deserialize)]` record.

mod boolean;
mod int;
mod string;
mod temp;

pub use boolean::FlexBool;
pub use int::FlexInt;
pub use string::FlexString;
pub use temp::FlexTemp;

use serde::Serializer;
use serde_json::Value;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Human name of a JSON shape, used in `UnsupportedShape` errors.
pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shortest decimal rendering that parses back to the same `f64`.
pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}

/// Best-effort float parse. Garbled or empty input becomes 0, and so do
/// `NaN` and the infinities, which JSON cannot carry.
pub(crate) fn parse_lenient(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Emit a number the way the controller does: integral values without a
/// fractional part, everything else as a float.
#[allow(
    clippy::cast_possible_truncation,
    clippy::as_conversions,
    clippy::float_cmp
)]
pub(crate) fn serialize_number<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}
