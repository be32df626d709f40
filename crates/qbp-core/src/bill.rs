//! # Bill and Refund Models
//!
//! Typed shapes of the gateway's bill and refund resources.
//!
//! ## Wire vs. memory
//!
//! On the wire `amount.value` is a two-decimal string and timestamps are
//! ISO strings. In memory the amount is an `f64` and timestamps are
//! `DateTime<FixedOffset>`. The conversion happens once, in the
//! `TryFrom<Raw*>` impls wired into `Deserialize`; a payload whose fields
//! cannot be converted is rejected with [`QbpError::Parse`] instead of
//! producing a half-typed value.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QbpError;
use crate::identity::{BillId, RefundId};
use crate::normalize::{normalize_amount, Numeric};

/// Reserved custom-field key naming the calling SDK.
pub const API_CLIENT_KEY: &str = "apiClient";

/// Reserved custom-field key carrying the calling SDK's version.
pub const API_CLIENT_VERSION_KEY: &str = "apiClientVersion";

// -- Enumerations -------------------------------------------------------------

/// ISO 4217 currency code of a bill.
///
/// Codes the gateway adds later survive as [`Currency::Other`] so that the
/// exact string still reaches the signature check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    Rub,
    Kzt,
    Other(String),
}

impl Currency {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rub => "RUB",
            Self::Kzt => "KZT",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        match code.as_str() {
            "RUB" => Self::Rub,
            "KZT" => Self::Kzt,
            _ => Self::Other(code),
        }
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillStatusValue {
    Waiting,
    Paid,
    Rejected,
    Expired,
    Partial,
    Other(String),
}

impl BillStatusValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "WAITING",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Partial => "PARTIAL",
            Self::Other(value) => value,
        }
    }

    /// Whether the bill can no longer change state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected | Self::Expired)
    }
}

impl From<String> for BillStatusValue {
    fn from(value: String) -> Self {
        match value.as_str() {
            "WAITING" => Self::Waiting,
            "PAID" => Self::Paid,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            "PARTIAL" => Self::Partial,
            _ => Self::Other(value),
        }
    }
}

impl From<BillStatusValue> for String {
    fn from(value: BillStatusValue) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BillStatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Value objects ------------------------------------------------------------

/// Monetary amount. The gateway sends `value` as a two-decimal string;
/// it is held as a number here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAmount")]
pub struct Amount {
    pub currency: Currency,
    pub value: f64,
}

impl Amount {
    /// `value` rendered the way the gateway and the signature expect it.
    pub fn normalized_value(&self) -> Result<String, QbpError> {
        normalize_amount(self.value)
    }
}

#[derive(Deserialize)]
struct RawAmount {
    currency: Currency,
    value: Numeric,
}

impl TryFrom<RawAmount> for Amount {
    type Error = String;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        let value = raw
            .value
            .to_f64()
            .map_err(|_| format!("amount.value {:?} is not numeric", raw.value))?;
        Ok(Self {
            currency: raw.currency,
            value,
        })
    }
}

/// Current status of a bill and when it last changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawStatus")]
pub struct BillStatus {
    pub value: BillStatusValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    value: BillStatusValue,
    #[serde(default)]
    changed_date_time: Option<String>,
}

impl TryFrom<RawStatus> for BillStatus {
    type Error = String;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        Ok(Self {
            value: raw.value,
            changed_date_time: parse_timestamp("status.changedDateTime", raw.changed_date_time)?,
        })
    }
}

/// Payer contact details. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl Customer {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.account.is_none()
    }
}

// -- Bill ---------------------------------------------------------------------

/// A bill as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBill")]
pub struct Bill {
    pub site_id: String,
    pub bill_id: BillId,
    pub amount: Amount,
    pub status: BillStatus,
    pub customer: Customer,
    pub custom_fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_url: Option<String>,
}

impl Bill {
    /// Append a percent-encoded `successUrl` parameter to `pay_url`.
    ///
    /// No-op when the bill has no pay URL.
    pub fn append_success_url(&mut self, success_url: &str) {
        if let Some(pay_url) = self.pay_url.as_mut() {
            let separator = if pay_url.contains('?') { '&' } else { '?' };
            pay_url.push(separator);
            pay_url.push_str("successUrl=");
            pay_url.push_str(&urlencoding::encode(success_url));
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBill {
    site_id: String,
    bill_id: BillId,
    amount: Amount,
    status: BillStatus,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    custom_fields: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    creation_date_time: Option<String>,
    #[serde(default)]
    expiration_date_time: Option<String>,
    #[serde(default)]
    pay_url: Option<String>,
}

impl TryFrom<RawBill> for Bill {
    type Error = String;

    fn try_from(raw: RawBill) -> Result<Self, Self::Error> {
        let custom_fields = raw
            .custom_fields
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self {
            site_id: raw.site_id,
            bill_id: raw.bill_id,
            amount: raw.amount,
            status: raw.status,
            customer: raw.customer.unwrap_or_default(),
            custom_fields,
            comment: raw.comment,
            creation_date_time: parse_timestamp("creationDateTime", raw.creation_date_time)?,
            expiration_date_time: parse_timestamp("expirationDateTime", raw.expiration_date_time)?,
            pay_url: raw.pay_url,
        })
    }
}

// -- Refund -------------------------------------------------------------------

/// A refund issued against a paid bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRefund")]
pub struct Refund {
    pub refund_id: RefundId,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<FixedOffset>>,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRefund {
    refund_id: RefundId,
    amount: Amount,
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    status: String,
}

impl TryFrom<RawRefund> for Refund {
    type Error = String;

    fn try_from(raw: RawRefund) -> Result<Self, Self::Error> {
        Ok(Self {
            refund_id: raw.refund_id,
            amount: raw.amount,
            datetime: parse_timestamp("datetime", raw.datetime)?,
            status: raw.status,
        })
    }
}

// -- Post-processing ----------------------------------------------------------

/// Convert a raw bill body into a [`Bill`], appending `success_url` to the
/// pay URL when given.
///
/// # Errors
///
/// `Parse` when the body does not have the bill shape.
pub fn pack_bill(body: Value, success_url: Option<&str>) -> Result<Bill, QbpError> {
    let mut bill: Bill = serde_json::from_value(body)?;
    if let Some(url) = success_url {
        bill.append_success_url(url);
    }
    Ok(bill)
}

/// Convert a raw refund body into a [`Refund`].
pub fn pack_refund(body: Value) -> Result<Refund, QbpError> {
    Ok(serde_json::from_value(body)?)
}

fn parse_timestamp(
    field: &str,
    raw: Option<String>,
) -> Result<Option<DateTime<FixedOffset>>, String> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map_err(|e| format!("{field} {s:?} is not an ISO timestamp: {e}"))
    })
    .transpose()
}
