//! Hosted checkout links.
//!
//! A payment form URL is built locally from the merchant's public key and
//! bill parameters; no request is sent. The payer opens the link and the
//! gateway creates the bill when the form is submitted.

use qbp_core::{normalize_amount, query, BillId, Customer, Numeric};
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::{stamp_custom_fields, BillPaymentsClient};

/// Parameters of a checkout link.
#[derive(Debug, Clone, Default)]
pub struct CreatePaymentFormParams {
    pub public_key: String,
    /// Left for the payer to enter when absent or zero.
    pub amount: Option<Numeric>,
    pub bill_id: Option<BillId>,
    pub customer: Customer,
    pub comment: Option<String>,
    /// Redirect target forwarded to the checkout page as `successUrl`.
    pub success_url: Option<String>,
    /// Sent as `customFields[key]=value` in insertion order.
    pub custom_fields: Map<String, Value>,
}

impl CreatePaymentFormParams {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            ..Self::default()
        }
    }
}

impl BillPaymentsClient {
    /// Build a checkout link for `params`.
    ///
    /// Parameters are emitted in a fixed order: `publicKey`, `amount`,
    /// `billId`, customer fields, `comment`, `successUrl`, then
    /// `customFields[...]`. Only `successUrl` is percent-encoded.
    ///
    /// # Errors
    ///
    /// `Core(InvalidInput)` when the amount is not numeric.
    pub fn create_payment_form(
        &self,
        params: &CreatePaymentFormParams,
    ) -> Result<String, ClientError> {
        let mut fields = Map::new();
        fields.insert("publicKey".into(), params.public_key.clone().into());

        if let Some(amount) = &params.amount {
            let amount = normalize_amount(amount.clone())?;
            if !is_zero(&amount) {
                fields.insert("amount".into(), amount.into());
            }
        }
        if let Some(bill_id) = &params.bill_id {
            fields.insert("billId".into(), bill_id.as_str().into());
        }

        let customer = [
            ("phone", &params.customer.phone),
            ("email", &params.customer.email),
            ("account", &params.customer.account),
        ];
        for (key, value) in customer {
            if let Some(value) = value {
                fields.insert(key.into(), value.clone().into());
            }
        }

        if let Some(comment) = &params.comment {
            fields.insert("comment".into(), comment.clone().into());
        }
        if let Some(url) = &params.success_url {
            fields.insert("successUrl".into(), urlencoding::encode(url).into_owned().into());
        }
        fields.insert(
            "customFields".into(),
            Value::Object(stamp_custom_fields(&params.custom_fields)),
        );

        let query = query::stringify(&Value::Object(fields))?;
        Ok(format!("{}?{query}", self.checkout_url))
    }
}

/// True for a normalized amount that rounds to zero (`"0.00"`, `"-0.00"`).
fn is_zero(normalized: &str) -> bool {
    normalized
        .trim_start_matches('-')
        .chars()
        .all(|c| c == '0' || c == '.')
}
