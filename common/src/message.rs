use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WidgetError;

// Body of a successful GET or POST on the challenge endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChallengeJson {
    pub instance: InstanceJson,
    pub time: TimeJson,
    #[serde(default)]
    pub endpoints: Vec<EndpointJson>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstanceJson {
    pub owner: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeJson {
    pub created_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub duration: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EndpointJson {
    pub connection: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Decodes a challenge response body. `Ok(None)` means "no instance": an
/// empty body or any falsy JSON value (`null`, `false`, `0`, `""`, `{}`, `[]`).
pub fn decode_body(body: &str) -> Result<Option<ChallengeJson>, WidgetError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
