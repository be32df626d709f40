//! # Notification Signatures
//!
//! The gateway signs each webhook notification with HMAC-SHA256 keyed by
//! the merchant secret. The signed message is built from five bill fields:
//!
//! | Name | Source |
//! |------|--------|
//! | `amount.currency` | `bill.amount.currency` |
//! | `amount.value` | `bill.amount.value`, two decimals |
//! | `billId` | `bill.billId` |
//! | `siteId` | `bill.siteId` |
//! | `status` | `bill.status.value` |
//!
//! Values are ordered by field name and joined with `|`. Any change to the
//! ordering, the separator or the amount formatting silently breaks every
//! verification, so the canonical string is exposed for testing.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::bill::Bill;
use crate::error::QbpError;
use crate::notification::NotificationBody;

type HmacSha256 = Hmac<Sha256>;

const VALUE_SEPARATOR: &str = "|";

/// Build the message the gateway signs for `bill`.
///
/// # Errors
///
/// `InvalidInput` when the amount cannot be formatted.
pub fn canonical_string(bill: &Bill) -> Result<String, QbpError> {
    let fields: BTreeMap<&str, String> = BTreeMap::from([
        ("billId", bill.bill_id.as_str().to_string()),
        ("amount.value", bill.amount.normalized_value()?),
        ("amount.currency", bill.amount.currency.as_str().to_string()),
        ("siteId", bill.site_id.clone()),
        ("status", bill.status.value.as_str().to_string()),
    ]);

    Ok(fields
        .into_values()
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR))
}

/// Lowercase hex HMAC-SHA256 of the canonical string of `bill`.
pub fn compute_signature(bill: &Bill, merchant_secret: &str) -> Result<String, QbpError> {
    let message = canonical_string(bill)?;
    let mut mac = HmacSha256::new_from_slice(merchant_secret.as_bytes())
        .map_err(|e| QbpError::InvalidInput(format!("unusable merchant secret: {e}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a notification's signature header against its body.
///
/// The digest comparison runs in constant time. Returns `false` when the
/// signature cannot be computed at all.
pub fn check_signature(
    signature: &str,
    notification: &NotificationBody,
    merchant_secret: &str,
) -> bool {
    match compute_signature(&notification.bill, merchant_secret) {
        Ok(expected) => expected.as_bytes().ct_eq(signature.as_bytes()).into(),
        Err(_) => false,
    }
}
