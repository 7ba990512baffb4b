use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as J;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::core::error::GatewayError;
use crate::core::mcp::{err as rpc_err, ok as rpc_ok, InitializeResult, RpcReq, RpcResp};
use crate::domain::ContentRepository;
use crate::infra::http::json as http_json;
use crate::tools::catalogue::tools_list;
use crate::tools::dispatch::ToolDispatcher;

/// The fixed JSON-RPC method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ToolsList,
    ToolsCall,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Method::Initialize),
            "tools/list" => Some(Method::ToolsList),
            "tools/call" => Some(Method::ToolsCall),
            _ => None,
        }
    }
}

/// Stateless per-request protocol handler. Cloning shares the dispatcher.
#[derive(Clone)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { dispatcher: ToolDispatcher::new(repo) }
    }

    /// Always answers: failures become JSON-RPC error objects carrying the request id.
    pub async fn handle(&self, req: RpcReq) -> RpcResp {
        let id = req.id.clone();
        tracing::debug!(method = %req.method, id = ?id, "handling request");
        match self.route(req).await {
            Ok(result) => rpc_ok(id, result),
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "request failed");
                rpc_err(id, e.code(), e.to_string(), e.data())
            }
        }
    }

    /// One stdio frame. `None` for notifications, which get no reply.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResp> {
        match serde_json::from_str::<RpcReq>(line) {
            Ok(req) if req.is_notification() => {
                tracing::debug!(method = %req.method, "notification received");
                None
            }
            Ok(req) => Some(self.handle(req).await),
            Err(e) => Some(http_json::parse_error(format!("parse error: {e}")).0),
        }
    }

    async fn route(&self, req: RpcReq) -> Result<J, GatewayError> {
        let method = Method::parse(&req.method).ok_or_else(|| GatewayError::UnknownMethod(req.method.clone()))?;
        match method {
            Method::Initialize => to_json(InitializeResult::current()),
            Method::ToolsList => Ok(tools_list()),
            Method::ToolsCall => self.call_tool(req.params).await,
        }
    }

    async fn call_tool(&self, params: J) -> Result<J, GatewayError> {
        let name = params
            .get("name")
            .and_then(J::as_str)
            .ok_or_else(|| GatewayError::Internal("missing tool name".into()))?
            .to_owned();
        let args = params.get("arguments").cloned().unwrap_or(J::Null);
        let dispatcher = self.dispatcher.clone();
        // A panicking tool must not take the connection down with it.
        let result = tokio::spawn(async move { dispatcher.call(&name, &args).await })
            .await
            .map_err(|e| GatewayError::Internal(format!("tool call aborted: {e}")))??;
        to_json(result)
    }
}

fn to_json(v: impl serde::Serialize) -> Result<J, GatewayError> {
    serde_json::to_value(v).map_err(|e| GatewayError::Internal(e.to_string()))
}

// HTTP handler
pub async fn http(State(server): State<McpServer>, body: Result<Json<RpcReq>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected request body");
            return (StatusCode::BAD_REQUEST, http_json::parse_error(rejection.body_text())).into_response();
        }
    };
    if req.is_notification() {
        return StatusCode::ACCEPTED.into_response();
    }
    let resp = server.handle(req).await;
    tracing::trace!(response = ?resp, "HTTP handler completed");
    Json(resp).into_response()
}

// Stdio loop: newline-delimited JSON-RPC frames on stdin/stdout.
pub async fn stdio_loop(server: McpServer) -> anyhow::Result<()> {
    tracing::info!("mode=stdio");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(resp) = server.handle_line(&line).await else {
            continue;
        };
        let mut s = serde_json::to_string(&resp)?;
        s.push('\n');
        stdout.write_all(s.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{INTERNAL_ERROR, METHOD_NOT_FOUND, PARSE_ERROR};
    use crate::tools::testing::{FailingRepo, MemoryRepo};
    use axum::body::{to_bytes, Body};
    use axum::{routing::post, Router};
    use hyper::Request;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    const BODY_LIMIT: usize = 1024 * 1024;

    fn server() -> McpServer {
        McpServer::new(Arc::new(MemoryRepo::default()))
    }

    fn req(v: J) -> RpcReq {
        serde_json::from_value(v).unwrap()
    }

    fn router_with_state(server: McpServer) -> Router {
        Router::new().route("/mcp", post(super::http)).with_state(server)
    }

    async fn post_json(app: &Router, body: &str) -> (StatusCode, J) {
        let req = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let v = if bytes.is_empty() { J::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, v)
    }

    #[test]
    fn parses_only_the_fixed_method_set() {
        assert_eq!(Method::parse("initialize"), Some(Method::Initialize));
        assert_eq!(Method::parse("tools/list"), Some(Method::ToolsList));
        assert_eq!(Method::parse("tools/call"), Some(Method::ToolsCall));
        assert_eq!(Method::parse("tools.list"), None);
    }

    #[tokio::test]
    async fn initialize_returns_capabilities() {
        let resp = server().handle(req(json!({"jsonrpc":"2.0","id":1,"method":"initialize"}))).await;
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["capabilities"]["tools"], json!({}));
        assert_eq!(result["serverInfo"]["name"], "da-live-admin");
        assert_eq!(resp.id, json!(1));
        assert_eq!(resp.jsonrpc, "2.0");
    }

    #[tokio::test]
    async fn tools_list_is_unaffected_by_prior_calls() {
        let s = server();
        let before = s.handle(req(json!({"jsonrpc":"2.0","id":1,"method":"tools/list"}))).await;
        s.handle(req(json!({
            "jsonrpc":"2.0","id":2,"method":"tools/call",
            "params":{"name":"da_create_source","arguments":{"org":"o","repo":"r","path":"p","content":"c"}}
        })))
        .await;
        let after = s.handle(req(json!({"jsonrpc":"2.0","id":3,"method":"tools/list"}))).await;
        let tools = after.result.unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 12);
        assert_eq!(before.result.unwrap(), tools);
    }

    #[tokio::test]
    async fn unknown_method_embeds_name() {
        let resp = server().handle(req(json!({"jsonrpc":"2.0","id":"x","method":"resources/list"}))).await;
        let e = resp.error.unwrap();
        assert_eq!(e.code, METHOD_NOT_FOUND);
        assert!(e.message.contains("resources/list"));
        assert_eq!(resp.id, json!("x"));
        assert!(resp.result.is_none());
    }

    #[tokio::test]
    async fn unknown_tool_is_a_normal_result() {
        let resp = server()
            .handle(req(json!({
                "jsonrpc":"2.0","id":4,"method":"tools/call",
                "params":{"name":"da_nope","arguments":{}}
            })))
            .await;
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Unknown tool: da_nope");
    }

    #[tokio::test]
    async fn remote_failures_become_internal_errors() {
        let s = McpServer::new(Arc::new(FailingRepo::remote(404, "not found")));
        let resp = s
            .handle(req(json!({
                "jsonrpc":"2.0","id":5,"method":"tools/call",
                "params":{"name":"da_get_source","arguments":{"org":"o","repo":"r","path":"x"}}
            })))
            .await;
        let e = resp.error.unwrap();
        assert_eq!(e.code, INTERNAL_ERROR);
        assert_eq!(e.message, "not found");
        assert_eq!(e.data.unwrap()["status"], 404);
        assert_eq!(resp.id, json!(5));
    }

    #[tokio::test]
    async fn missing_tool_name_is_an_internal_error() {
        let resp = server().handle(req(json!({"jsonrpc":"2.0","id":6,"method":"tools/call"}))).await;
        let e = resp.error.unwrap();
        assert_eq!(e.code, INTERNAL_ERROR);
        assert_eq!(e.message, "missing tool name");
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_leak_into_each_other() {
        let slow = McpServer::new(Arc::new(FailingRepo::timeout_after(Duration::from_millis(100))));
        let fast = server();
        let (a, b) = tokio::join!(
            slow.handle(req(json!({
                "jsonrpc":"2.0","id":"slow","method":"tools/call",
                "params":{"name":"da_lookup_media","arguments":{"org":"o","repo":"r","mediaPath":"a.png"}}
            }))),
            fast.handle(req(json!({
                "jsonrpc":"2.0","id":"fast","method":"tools/call",
                "params":{"name":"da_lookup_media","arguments":{"org":"o","repo":"r","mediaPath":"b.png"}}
            }))),
        );
        assert_eq!(a.id, json!("slow"));
        assert_eq!(a.error.unwrap().message, "Request timeout");
        assert_eq!(b.id, json!("fast"));
        assert_eq!(b.result.unwrap()["structuredContent"]["path"], "b.png");
    }

    #[tokio::test]
    async fn stdio_frames_handle_parse_errors_and_notifications() {
        let s = server();
        let resp = s.handle_line("{ not-json }").await.unwrap();
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
        assert!(resp.id.is_null());

        assert!(s
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());

        let resp = s.handle_line(r#"{"jsonrpc":"2.0","id":9,"method":"tools/list"}"#).await.unwrap();
        assert_eq!(resp.id, json!(9));
    }

    #[tokio::test]
    async fn http_tools_list_returns_200_and_array() {
        let app = router_with_state(server());
        let (status, v) = post_json(&app, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;
        assert!(status.is_success());
        assert!(v["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn http_unknown_method_returns_method_not_found() {
        let app = router_with_state(server());
        let (_, v) = post_json(&app, r#"{"jsonrpc":"2.0","id":4,"method":"nope"}"#).await;
        assert_eq!(v["error"]["code"], -32601);
        assert_eq!(v["error"]["message"], "Method not found: nope");
    }

    #[tokio::test]
    async fn http_parse_error_on_malformed_json() {
        let app = router_with_state(server());
        let (status, v) = post_json(&app, "{ not-json }").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"]["code"], -32700);
        assert_eq!(v["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn http_notifications_are_accepted_without_body() {
        let app = router_with_state(server());
        let (status, v) = post_json(&app, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(v.is_null());
    }
}
