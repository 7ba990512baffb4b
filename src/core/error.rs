use serde_json::Value as JsonValue;
use thiserror::Error;

/// JSON-RPC error codes used by the gateway.
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

/// Uniform failure value produced by the DA Admin client for every
/// non-success outcome.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timeout")]
    Timeout,
    #[error("{message}")]
    Remote {
        status: u16,
        message: String,
        details: Option<JsonValue>,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP-style status: 408 for timeouts, the remote status otherwise.
    /// Transport failures never reached a response and carry none.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Timeout => Some(408),
            ApiError::Remote { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }

    pub fn details(&self) -> Option<&JsonValue> {
        match self {
            ApiError::Remote { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

/// Gateway-wide error model for uniform JSON-RPC mapping.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not found: {0}")]
    UnknownMethod(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Internal(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn code(&self) -> i32 {
        match self {
            GatewayError::UnknownMethod(_) => METHOD_NOT_FOUND,
            _ => INTERNAL_ERROR,
        }
    }

    /// Structured payload for the JSON-RPC `error.data` field.
    pub fn data(&self) -> Option<JsonValue> {
        match self {
            GatewayError::Api(api) => api.status().map(|status| {
                serde_json::json!({ "status": status, "details": api.details() })
            }),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(e: anyhow::Error) -> Self {
        GatewayError::Internal(e.to_string())
    }
}
