use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::RequestBuilder;

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    let now = chrono::Utc::now();
    format!("da-{}-{}", now.timestamp(), now.timestamp_subsec_nanos())
}

/// Add standard headers to an outgoing request. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder
        .header("x-request-id", rid.as_str())
        .header(USER_AGENT, format!("da-live-mcp-gateway/{}", env!("CARGO_PKG_VERSION")));
    (b, rid)
}

/// Bearer credential plus JSON content type, attached to every DA Admin call.
pub fn add_api_headers(builder: RequestBuilder, api_token: &str) -> RequestBuilder {
    builder
        .header(AUTHORIZATION, format!("Bearer {api_token}"))
        .header(CONTENT_TYPE, "application/json")
}
