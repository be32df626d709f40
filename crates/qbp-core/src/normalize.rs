//! # Value Normalization
//!
//! The gateway expects amounts as strings with exactly two decimal places
//! and timestamps as `YYYY-MM-DDTHH:mm:ss±HH:mm`. Both encodings feed the
//! notification signature, so they must be reproducible bit-for-bit.
//!
//! ## Rounding
//!
//! Amounts are rounded as decimals, half away from zero. A float is first
//! rendered in its shortest round-trip form, so `200.345` rounds to
//! `200.35` even though the nearest binary double lies just below it.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Duration, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QbpError;

/// Default bill lifetime used by [`lifetime_by_day`] callers.
pub const DEFAULT_LIFETIME_DAYS: i64 = 45;

const AMOUNT_SCALE: i64 = 2;

/// A number or a numeric string.
///
/// Callers pass amounts either way, and the gateway itself sends
/// `amount.value` as a string in API responses but as a number in some
/// notification payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Parse into an exact decimal.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for non-finite floats and non-numeric text.
    pub fn to_decimal(&self) -> Result<BigDecimal, QbpError> {
        match self {
            Self::Number(v) if !v.is_finite() => Err(QbpError::InvalidInput(format!(
                "amount must be a finite number, got {v}"
            ))),
            Self::Number(v) => BigDecimal::from_str(&v.to_string())
                .map_err(|e| QbpError::InvalidInput(format!("amount {v} is not a decimal: {e}"))),
            Self::Text(s) => BigDecimal::from_str(s.trim())
                .map_err(|_| QbpError::InvalidInput(format!("amount {s:?} is not numeric"))),
        }
    }

    /// Parse into a float.
    pub fn to_f64(&self) -> Result<f64, QbpError> {
        match self {
            Self::Number(v) if v.is_finite() => Ok(*v),
            Self::Number(v) => Err(QbpError::InvalidInput(format!(
                "amount must be a finite number, got {v}"
            ))),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| QbpError::InvalidInput(format!("amount {s:?} is not numeric"))),
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Numeric {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<u32> for Numeric {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<u64> for Numeric {
    fn from(v: u64) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&str> for Numeric {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Numeric {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Format an amount with exactly two decimal places.
///
/// # Errors
///
/// `InvalidInput` when the amount is not numeric.
pub fn normalize_amount(amount: impl Into<Numeric>) -> Result<String, QbpError> {
    let rounded = amount
        .into()
        .to_decimal()?
        .with_scale_round(AMOUNT_SCALE, RoundingMode::HalfUp);
    let (units, scale) = rounded.as_bigint_and_exponent();
    debug_assert_eq!(scale, AMOUNT_SCALE);

    let text = units.to_string();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, text.as_str()),
    };
    let digits = format!("{digits:0>3}");
    let (int_part, frac_part) = digits.split_at(digits.len() - 2);
    let sign = if negative { "-" } else { "" };
    Ok(format!("{sign}{int_part}.{frac_part}"))
}

/// Format a timestamp in the process's local offset.
pub fn normalize_date(date: &DateTime<Utc>) -> String {
    format_with_offset(&date.with_timezone(&Local))
}

/// Format a timestamp in an explicit offset.
pub fn normalize_date_in(date: &DateTime<Utc>, offset: &FixedOffset) -> String {
    format_with_offset(&date.with_timezone(offset))
}

fn format_with_offset<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// The instant `days` days from now.
///
/// # Errors
///
/// `InvalidInput` when the result falls outside the representable range.
pub fn expiration_by_day(days: i64) -> Result<DateTime<Utc>, QbpError> {
    Duration::try_days(days)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| QbpError::InvalidInput(format!("lifetime of {days} days is out of range")))
}

/// [`normalize_date`] of the instant `days` days from now.
pub fn lifetime_by_day(days: i64) -> Result<String, QbpError> {
    expiration_by_day(days).map(|at| normalize_date(&at))
}
