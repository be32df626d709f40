//! Webhook notification payloads.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::bill::Bill;
use crate::error::QbpError;
use crate::normalize::Numeric;

/// Body of a bill-status notification sent by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNotification")]
pub struct NotificationBody {
    pub bill: Bill,
    /// Notification protocol version; `None` when the body omits it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

#[derive(Deserialize)]
struct RawNotification {
    bill: Bill,
    #[serde(default)]
    version: Option<Numeric>,
}

impl TryFrom<RawNotification> for NotificationBody {
    type Error = String;

    fn try_from(raw: RawNotification) -> Result<Self, Self::Error> {
        let version = raw.version.map(|version| parse_version(&version)).transpose()?;

        Ok(Self {
            bill: raw.bill,
            version,
        })
    }
}

fn parse_version(version: &Numeric) -> Result<u32, String> {
    match version {
        Numeric::Number(v) if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(v) => {
            Some(*v as u32)
        }
        Numeric::Number(_) => None,
        Numeric::Text(s) => s.trim().parse().ok(),
    }
    .ok_or_else(|| format!("version {version} is not a protocol version number"))
}

impl NotificationBody {
    /// Decode a notification from the raw request body.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed JSON or a payload without the bill shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, QbpError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode a notification from a byte stream.
    pub fn from_reader(reader: impl Read) -> Result<Self, QbpError> {
        Ok(serde_json::from_reader(reader)?)
    }
}
