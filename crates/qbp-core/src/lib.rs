//! # qbp-core: Network-Free Core of the Bill Payments Client
//!
//! Everything in this crate is pure data shaping. Nothing here opens a
//! socket; the async client in `qbp-client` composes these pieces into
//! authenticated gateway calls.
//!
//! ## Modules
//!
//! - [`query`]: flattens nested JSON objects into the bracket-encoded
//!   query strings the hosted checkout page expects.
//! - [`normalize`]: two-decimal amount strings and offset-qualified
//!   ISO timestamps.
//! - [`signature`]: HMAC-SHA256 over the canonical notification fields.
//! - [`bill`]: typed bill and refund models with an explicit parse step
//!   from the gateway's wire shape.
//! - [`notification`]: webhook payload decoding.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `qbp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod bill;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod notification;
pub mod query;
pub mod signature;

pub use bill::{
    pack_bill, pack_refund, Amount, Bill, BillStatus, BillStatusValue, Currency, Customer,
    Refund, API_CLIENT_KEY, API_CLIENT_VERSION_KEY,
};
pub use error::{ApiError, QbpError};
pub use identity::{BillId, RefundId};
pub use normalize::{
    expiration_by_day, lifetime_by_day, normalize_amount, normalize_date, normalize_date_in,
    Numeric, DEFAULT_LIFETIME_DAYS,
};
pub use notification::NotificationBody;
pub use signature::{canonical_string, check_signature, compute_signature};
