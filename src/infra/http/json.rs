use axum::Json;

use crate::core::error::PARSE_ERROR;
use crate::core::mcp::{err as rpc_err, RpcResp};

/// JSON-RPC parse error; the request id is unknowable so it is `null`.
pub fn parse_error(message: impl Into<String>) -> Json<RpcResp> {
    Json(rpc_err(serde_json::Value::Null, PARSE_ERROR, message, None))
}
