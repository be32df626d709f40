//! Refund operations.
//!
//! | Method | Path (relative to API base) | Operation |
//! |--------|-----------------------------|-----------|
//! | PUT    | `/{billId}/refunds/{refundId}` | Refund a paid bill |
//! | GET    | `/{billId}/refunds/{refundId}` | Get refund info |

use qbp_core::{pack_refund, BillId, Currency, Numeric, Refund, RefundId};
use reqwest::Method;
use serde::Serialize;

use crate::bills::WireAmount;
use crate::error::ClientError;
use crate::BillPaymentsClient;

#[derive(Debug, Serialize)]
struct RefundBody<'a> {
    amount: WireAmount<'a>,
}

impl BillPaymentsClient {
    /// Refund part or all of a paid bill.
    ///
    /// Calls `PUT {api_url}/{billId}/refunds/{refundId}`.
    pub async fn refund(
        &self,
        bill_id: &BillId,
        refund_id: &RefundId,
        amount: impl Into<Numeric>,
        currency: &Currency,
    ) -> Result<Refund, ClientError> {
        let amount = amount.into();
        let body = RefundBody {
            amount: WireAmount::new(currency, &amount)?,
        };
        let value = self
            .request(
                Method::PUT,
                &[bill_id.as_str(), "refunds", refund_id.as_str()],
                Some(&body),
            )
            .await?;
        Ok(pack_refund(value)?)
    }

    /// Get a refund's current state.
    ///
    /// Calls `GET {api_url}/{billId}/refunds/{refundId}`.
    pub async fn get_refund_info(
        &self,
        bill_id: &BillId,
        refund_id: &RefundId,
    ) -> Result<Refund, ClientError> {
        let value = self
            .request::<()>(
                Method::GET,
                &[bill_id.as_str(), "refunds", refund_id.as_str()],
                None,
            )
            .await?;
        Ok(pack_refund(value)?)
    }
}
