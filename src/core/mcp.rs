//! Shared MCP protocol surface: JSON-RPC envelopes and the initialize result.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

/// MCP protocol revision advertised by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "da-live-admin";

// --- JSON-RPC structures ---

#[derive(Deserialize, Debug)]
pub struct RpcReq {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: J,
    pub method: String,
    #[serde(default)]
    pub params: J,
}

impl RpcReq {
    /// Notifications carry no id and expect no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_null() && self.method.starts_with("notifications/")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResp {
    pub jsonrpc: String,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<J>,
}

pub fn ok(id: J, result: J) -> RpcResp {
    RpcResp { jsonrpc: "2.0".into(), id, result: Some(result), error: None }
}
pub fn err(id: J, code: i32, msg: impl Into<String>, data: Option<J>) -> RpcResp {
    RpcResp {
        jsonrpc: "2.0".into(),
        id,
        result: None,
        error: Some(RpcErr { code, message: msg.into(), data }),
    }
}

// --- Initialize result ---

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerCapabilities {
    pub tools: serde_json::Map<String, J>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl InitializeResult {
    pub fn current() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
        }
    }
}
