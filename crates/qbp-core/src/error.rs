//! # Error Types
//!
//! `QbpError` covers failures that originate locally: malformed caller
//! input and payloads that do not match the gateway's documented shape.
//! `ApiError` is the gateway's own business error, reported in a response
//! body carrying an `errorCode` field.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Local failures of the core crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QbpError {
    /// Caller-supplied input cannot be encoded for the gateway.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A gateway response or notification payload is malformed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for QbpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Business error reported by the gateway.
///
/// Every field except `error_code` is optional on the wire and defaults to
/// an empty string. `datetime` is `None` when absent or not RFC 3339.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{error_code}: {description}")]
pub struct ApiError {
    pub error_code: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub datetime: Option<DateTime<FixedOffset>>,
}

impl ApiError {
    /// Extract a gateway error from a response body.
    ///
    /// Returns `None` when the body has no string `errorCode`, i.e. when it
    /// is a success payload.
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        body.get("errorCode")?.as_str()?;
        // errorCode is a string, so deserialization only fails on
        // mistyped optional fields; fall back to the code alone then.
        Some(serde_json::from_value(body.clone()).unwrap_or_else(|_| Self {
            error_code: body
                .get("errorCode")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            service_name: String::new(),
            description: String::new(),
            user_message: String::new(),
            trace_id: String::new(),
            datetime: None,
        }))
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()))
}
