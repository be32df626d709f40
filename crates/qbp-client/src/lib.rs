//! # qbp-client: Typed async client for the bill payments gateway
//!
//! Provides typed access to the gateway's bills REST API:
//! - **Bills**: create, look up and cancel (`bills` module)
//! - **Refunds**: refund a paid bill and look up a refund (`refunds` module)
//! - **Checkout links**: hosted payment-form URLs, built locally (`form` module)
//! - **Notifications**: signature check for inbound webhooks
//!
//! ## Request pipeline
//!
//! Every call goes through one request builder: the bill
//! identifier is appended to the API base as a path segment, the bearer
//! key is read from the [`KeyProvider`], the body is serialized, and the
//! request is handed to the [`HttpTransport`]. The response body is then
//! classified: a string `errorCode` becomes [`ClientError::Api`], any other
//! non-2xx status becomes [`ClientError::UnexpectedStatus`], and a success
//! body goes through the typed parse in `qbp-core`.
//!
//! There are no retries, timeouts or caches: each operation is exactly one
//! round trip and every failure reaches the caller.

pub mod bills;
pub mod config;
pub mod credentials;
pub mod error;
pub mod form;
pub mod refunds;
pub mod transport;

pub use bills::CreateBillParams;
pub use config::{ClientConfig, ConfigError};
pub use credentials::{KeyProvider, StaticKey};
pub use error::ClientError;
pub use form::CreatePaymentFormParams;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

use std::sync::Arc;

use qbp_core::{
    check_signature, ApiError, BillId, NotificationBody, QbpError, API_CLIENT_KEY,
    API_CLIENT_VERSION_KEY,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;
use zeroize::Zeroizing;

/// Value stamped into the `apiClient` custom field.
pub const CLIENT_NAME: &str = "rust_sdk";

/// Value stamped into the `apiClientVersion` custom field.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gateway client.
///
/// Cheap to clone; clones share the transport and key provider.
#[derive(Clone)]
pub struct BillPaymentsClient {
    transport: Arc<dyn HttpTransport>,
    key: Arc<dyn KeyProvider>,
    api_url: Url,
    checkout_url: Url,
}

impl std::fmt::Debug for BillPaymentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillPaymentsClient")
            .field("api_url", &self.api_url)
            .field("checkout_url", &self.checkout_url)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl BillPaymentsClient {
    /// Create a client that talks to the gateway over `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new().map_err(|e| ClientError::Transport {
            endpoint: "client_init".into(),
            source: Box::new(e),
        })?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            key: Arc::new(StaticKey::from(config.secret_key)),
            api_url: config.api_url,
            checkout_url: config.checkout_url,
        }
    }

    /// Replace the merchant secret key used by subsequent calls.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = Arc::new(StaticKey::new(key));
    }

    /// Read the merchant secret key from `provider` on every call.
    pub fn set_key_provider(&mut self, provider: Arc<dyn KeyProvider>) {
        self.key = provider;
    }

    /// Generate a random bill identifier.
    pub fn generate_id(&self) -> BillId {
        BillId::generate()
    }

    /// Check a notification signature using the current secret key.
    pub fn check_notification_signature(
        &self,
        signature: &str,
        notification: &NotificationBody,
    ) -> bool {
        check_signature(signature, notification, &self.key.secret_key())
    }

    // -- Request builder ------------------------------------------------------

    /// Send one authenticated request and classify the response body.
    ///
    /// `segments` are appended to the API base URL, percent-encoded.
    pub(crate) async fn request<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(segments)?;
        let endpoint = format!("{method} {}", url.path());
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(QbpError::from)?;

        tracing::debug!(%endpoint, has_body = body.is_some(), "sending gateway request");

        let resp = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers: self.headers()?,
                body,
            })
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let value: Value = match serde_json::from_str(&resp.body) {
            Ok(value) => value,
            Err(_) if !resp.is_success() => {
                return Err(ClientError::UnexpectedStatus {
                    endpoint,
                    status: resp.status,
                    body: resp.body,
                });
            }
            Err(e) => {
                return Err(QbpError::Parse(format!("{endpoint} returned invalid JSON: {e}")).into());
            }
        };

        if let Some(api_error) = ApiError::from_body(&value) {
            tracing::debug!(
                %endpoint,
                status = resp.status,
                error_code = %api_error.error_code,
                trace_id = %api_error.trace_id,
                "gateway returned an error"
            );
            return Err(ClientError::Api {
                endpoint,
                source: api_error,
            });
        }

        if !resp.is_success() {
            return Err(ClientError::UnexpectedStatus {
                endpoint,
                status: resp.status,
                body: resp.body,
            });
        }

        Ok(value)
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::InvalidUrl("api_url".into(), "URL cannot be a base".into())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let key = self.key.secret_key();
        let bearer = Zeroizing::new(format!("Bearer {}", key.as_str()));
        let mut auth = HeaderValue::from_str(&bearer).map_err(|_| ConfigError::InvalidKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }
}

/// Caller custom fields followed by the reserved SDK keys.
///
/// The SDK keys always win; every other caller key is kept as given.
pub(crate) fn stamp_custom_fields(caller: &Map<String, Value>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in caller {
        if key == API_CLIENT_KEY || key == API_CLIENT_VERSION_KEY {
            tracing::debug!(%key, "ignoring caller value for reserved custom field");
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }
    fields.insert(API_CLIENT_KEY.into(), CLIENT_NAME.into());
    fields.insert(API_CLIENT_VERSION_KEY.into(), CLIENT_VERSION.into());
    fields
}
