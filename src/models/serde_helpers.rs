//! Serde helpers for the loosely-typed fields in song JSON.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a loose JSON value as a bool. Accepts bool, numbers and
/// strings like "yes"/"no", "on"/"off", "1"/"0".
pub fn boolish_value(v: Option<&Value>, default: bool) -> bool {
    match v {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" | "on" => true,
            "false" | "f" | "0" | "no" | "n" | "off" => false,
            _ => default,
        },
        Some(_) => default,
    }
}

/// Deserialize a boolish field, defaulting to true when absent or
/// unrecognized. Hand-edited files carry strings like "no" here.
pub fn boolish_true<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(boolish_value(v.as_ref(), true))
}

pub fn default_true() -> bool {
    true
}
