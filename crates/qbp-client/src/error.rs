//! Gateway client error types.

use qbp_core::{ApiError, QbpError};

use crate::config::ConfigError;
use crate::transport::BoxError;

/// Errors from gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid caller input or a malformed gateway payload.
    #[error(transparent)]
    Core(#[from] QbpError),
    /// The gateway reported a business error (`errorCode` in the body).
    #[error("gateway rejected {endpoint}: {source}")]
    Api {
        endpoint: String,
        source: ApiError,
    },
    /// Non-2xx status without a gateway error body.
    #[error("gateway {endpoint} returned {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Transport failure, propagated as reported by the transport.
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: BoxError,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The gateway's business error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}
