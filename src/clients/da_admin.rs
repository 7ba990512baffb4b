use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::error::{ApiError, GatewayError};
use crate::domain::{
    ApiResult, ConfigDocument, ContentRepository, FragmentReference, ListSourcesResponse, MediaReference,
    OperationResponse, Payload, RepoPath, SourceBody, SourceContent, TransferBody, VersionsResponse,
};
use crate::infra::config::DaAdminConfig;
use crate::infra::http::headers::{add_api_headers, add_standard_headers};
use crate::infra::logging::log_metric;
use crate::infra::runtime::limits::{make_http_client, with_deadline};

/// Top-level resource families of the DA Admin API (`/api/v1/<resource>/...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Source,
    Copy,
    Move,
    Versions,
    Config,
    Media,
    Fragment,
}

impl Resource {
    fn segment(self) -> &'static str {
        match self {
            Resource::Source => "source",
            Resource::Copy => "copy",
            Resource::Move => "move",
            Resource::Versions => "versions",
            Resource::Config => "config",
            Resource::Media => "media",
            Resource::Fragment => "fragment",
        }
    }
}

/// Authenticated, time-bounded client for the DA Admin API.
#[derive(Clone)]
pub struct DaAdminClient {
    base: Url,
    api_token: String,
    timeout: Duration,
    http: Client,
}

impl std::fmt::Debug for DaAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaAdminClient")
            .field("base", &self.base.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DaAdminClient {
    pub fn new(base_url: &str, api_token: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let base = Url::parse(base_url).map_err(|e| GatewayError::Config(format!("base url {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Config(format!("base url {base_url} cannot carry a path")));
        }
        Ok(Self { base, api_token: api_token.into(), timeout, http: make_http_client(timeout) })
    }

    pub fn from_config(cfg: &DaAdminConfig) -> Result<Self, GatewayError> {
        let token = cfg.api_token.clone().unwrap_or_default();
        Self::new(&cfg.base_url, token, Duration::from_millis(cfg.timeout_ms))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/api/v1/{resource}/{org}/{repo}[/{path...}]`, every segment escaped.
    pub fn endpoint(&self, resource: Resource, at: &RepoPath<'_>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v1", resource.segment()])
                .extend(at.segments());
        }
        url
    }

    fn builder(&self, method: Method, url: Url) -> RequestBuilder {
        let (builder, _rid) = add_standard_headers(self.http.request(method, url), None);
        add_api_headers(builder, &self.api_token)
    }

    async fn get<T: DeserializeOwned + Serialize>(&self, operation: &'static str, url: Url) -> ApiResult<Payload<T>> {
        tracing::debug!(operation, endpoint = %url, "da_admin GET");
        self.execute(operation, self.builder(Method::GET, url)).await
    }

    async fn send<T, B>(&self, operation: &'static str, method: Method, url: Url, body: &B) -> ApiResult<Payload<T>>
    where
        T: DeserializeOwned + Serialize,
        B: Serialize + ?Sized + Sync,
    {
        tracing::debug!(operation, method = %method, endpoint = %url, "da_admin request");
        self.execute(operation, self.builder(method, url).json(body)).await
    }

    async fn delete<T: DeserializeOwned + Serialize>(&self, operation: &'static str, url: Url) -> ApiResult<Payload<T>> {
        tracing::debug!(operation, endpoint = %url, "da_admin DELETE");
        self.execute(operation, self.builder(Method::DELETE, url)).await
    }

    async fn execute<T: DeserializeOwned + Serialize>(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> ApiResult<Payload<T>> {
        let start = Instant::now();
        let res = match with_deadline(self.timeout, exchange::<T>(builder)).await {
            Some(res) => res,
            None => Err(ApiError::Timeout),
        };
        match &res {
            Ok(_) => log_metric(operation, "remote_latency_ms", start.elapsed().as_millis() as f64),
            Err(e) => {
                log_metric(operation, "remote_error_total", 1.0);
                tracing::warn!(operation, status = ?e.status(), error = %e, "da_admin request failed");
            }
        }
        res
    }
}

async fn exchange<T: DeserializeOwned + Serialize>(builder: RequestBuilder) -> ApiResult<Payload<T>> {
    let resp = builder.send().await.map_err(transport)?;
    if !resp.status().is_success() {
        return Err(remote_error(resp).await);
    }
    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let body = resp.text().await.map_err(transport)?;
    if !is_json {
        return Ok(Payload::Text(body));
    }
    // A success is never turned into a failure by its body.
    match serde_json::from_str::<JsonValue>(&body) {
        Ok(value) => Ok(Payload::from_json(value)),
        Err(e) => {
            tracing::debug!(error = %e, "json content type with undecodable body; keeping text");
            Ok(Payload::Text(body))
        }
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e)
    }
}

/// Prefer the remote's JSON `message`; fall back to the status line text.
async fn remote_error(resp: Response) -> ApiError {
    let status = resp.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let details = resp
        .bytes()
        .await
        .ok()
        .and_then(|b| serde_json::from_slice::<JsonValue>(&b).ok());
    let message = details
        .as_ref()
        .and_then(|d| d.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .unwrap_or(status_text);
    ApiError::Remote { status: status.as_u16(), message, details }
}

#[async_trait]
impl ContentRepository for DaAdminClient {
    async fn list_sources(&self, org: &str, repo: &str, path: Option<&str>) -> ApiResult<Payload<ListSourcesResponse>> {
        let url = self.endpoint(Resource::Source, &RepoPath::new(org, repo, path));
        self.get("list_sources", url).await
    }

    async fn get_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<SourceContent>> {
        let url = self.endpoint(Resource::Source, &RepoPath::new(org, repo, Some(path)));
        self.get("get_source", url).await
    }

    async fn create_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Source, &RepoPath::new(org, repo, Some(path)));
        self.send("create_source", Method::POST, url, &SourceBody { content, content_type }).await
    }

    async fn update_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Source, &RepoPath::new(org, repo, Some(path)));
        self.send("update_source", Method::PUT, url, &SourceBody { content, content_type }).await
    }

    async fn delete_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Source, &RepoPath::new(org, repo, Some(path)));
        self.delete("delete_source", url).await
    }

    async fn copy_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Copy, &RepoPath::new(org, repo, None));
        self.send("copy_content", Method::POST, url, &TransferBody { source_path, destination_path }).await
    }

    async fn move_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Move, &RepoPath::new(org, repo, None));
        self.send("move_content", Method::POST, url, &TransferBody { source_path, destination_path }).await
    }

    async fn get_versions(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<VersionsResponse>> {
        let url = self.endpoint(Resource::Versions, &RepoPath::new(org, repo, Some(path)));
        self.get("get_versions", url).await
    }

    async fn get_config(&self, org: &str, repo: &str, config_path: Option<&str>) -> ApiResult<Payload<ConfigDocument>> {
        let url = self.endpoint(Resource::Config, &RepoPath::new(org, repo, config_path));
        self.get("get_config", url).await
    }

    async fn update_config(
        &self,
        org: &str,
        repo: &str,
        config: &ConfigDocument,
        config_path: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        let url = self.endpoint(Resource::Config, &RepoPath::new(org, repo, config_path));
        self.send("update_config", Method::PUT, url, config).await
    }

    async fn lookup_media(&self, org: &str, repo: &str, media_path: &str) -> ApiResult<Payload<MediaReference>> {
        let url = self.endpoint(Resource::Media, &RepoPath::new(org, repo, Some(media_path)));
        self.get("lookup_media", url).await
    }

    async fn lookup_fragment(&self, org: &str, repo: &str, fragment_path: &str) -> ApiResult<Payload<FragmentReference>> {
        let url = self.endpoint(Resource::Fragment, &RepoPath::new(org, repo, Some(fragment_path)));
        self.get("lookup_fragment", url).await
    }
}
