//! Bill operations.
//!
//! | Method | Path (relative to API base) | Operation |
//! |--------|-----------------------------|-----------|
//! | PUT    | `/{billId}`        | Create bill |
//! | GET    | `/{billId}`        | Get bill info |
//! | POST   | `/{billId}/reject` | Cancel unpaid bill |

use chrono::{DateTime, Utc};
use qbp_core::{
    normalize_amount, normalize_date, pack_bill, Bill, BillId, Currency, Customer, Numeric,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::{stamp_custom_fields, BillPaymentsClient};

/// Parameters of a new bill.
#[derive(Debug, Clone)]
pub struct CreateBillParams {
    pub amount: Numeric,
    pub currency: Currency,
    pub expiration_date_time: DateTime<Utc>,
    pub customer: Customer,
    pub comment: Option<String>,
    /// Redirect target after payment, appended to the returned `payUrl`.
    pub success_url: Option<String>,
    /// Extra fields stored with the bill, sent in insertion order.
    /// `apiClient` and `apiClientVersion` are reserved and always set by
    /// the client.
    pub custom_fields: Map<String, Value>,
}

impl CreateBillParams {
    /// Bill in the default currency with no optional fields.
    pub fn new(amount: impl Into<Numeric>, expiration_date_time: DateTime<Utc>) -> Self {
        Self {
            amount: amount.into(),
            currency: Currency::default(),
            expiration_date_time,
            customer: Customer::default(),
            comment: None,
            success_url: None,
            custom_fields: Map::new(),
        }
    }
}

/// `amount` object as the gateway expects it in request bodies.
#[derive(Debug, Serialize)]
pub(crate) struct WireAmount<'a> {
    currency: &'a str,
    value: String,
}

impl<'a> WireAmount<'a> {
    pub(crate) fn new(currency: &'a Currency, amount: &Numeric) -> Result<Self, ClientError> {
        Ok(Self {
            currency: currency.as_str(),
            value: normalize_amount(amount.clone())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBillBody<'a> {
    amount: WireAmount<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    expiration_date_time: String,
    customer: &'a Customer,
    custom_fields: Map<String, Value>,
}

impl BillPaymentsClient {
    /// Create a bill.
    ///
    /// Calls `PUT {api_url}/{billId}`. Creating the same bill identifier
    /// twice with identical parameters returns the existing bill.
    pub async fn create_bill(
        &self,
        bill_id: &BillId,
        params: &CreateBillParams,
    ) -> Result<Bill, ClientError> {
        let body = CreateBillBody {
            amount: WireAmount::new(&params.currency, &params.amount)?,
            comment: params.comment.as_deref(),
            expiration_date_time: normalize_date(&params.expiration_date_time),
            customer: &params.customer,
            custom_fields: stamp_custom_fields(&params.custom_fields),
        };

        let value = self
            .request(Method::PUT, &[bill_id.as_str()], Some(&body))
            .await?;
        Ok(pack_bill(value, params.success_url.as_deref())?)
    }

    /// Get a bill's current state.
    ///
    /// Calls `GET {api_url}/{billId}`.
    pub async fn get_bill_info(&self, bill_id: &BillId) -> Result<Bill, ClientError> {
        let value = self
            .request::<()>(Method::GET, &[bill_id.as_str()], None)
            .await?;
        Ok(pack_bill(value, None)?)
    }

    /// Cancel an unpaid bill.
    ///
    /// Calls `POST {api_url}/{billId}/reject`.
    pub async fn cancel_bill(&self, bill_id: &BillId) -> Result<Bill, ClientError> {
        let value = self
            .request::<()>(Method::POST, &[bill_id.as_str(), "reject"], None)
            .await?;
        Ok(pack_bill(value, None)?)
    }
}
