//! DA Admin data model and the repository contract the tools dispatch onto.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Open-ended configuration document; the remote schema is not fixed here.
pub type ConfigDocument = serde_json::Map<String, JsonValue>;

/// Successful response body: decoded JSON when the remote says so, raw text
/// otherwise. JSON that the typed model cannot reproduce exactly is kept as
/// `Raw` so nothing the remote sent is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Json(T),
    Text(String),
    Raw(JsonValue),
}

impl<T: Serialize + DeserializeOwned> Payload<T> {
    /// Typed only when re-serializing the typed value gives back `value`.
    pub fn from_json(value: JsonValue) -> Self {
        match T::deserialize(&value) {
            Ok(typed) if serde_json::to_value(&typed).is_ok_and(|v| v == value) => Payload::Json(typed),
            _ => Payload::Raw(value),
        }
    }
}

impl<T: Serialize> Payload<T> {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Payload::Json(v) => serde_json::to_value(v).unwrap_or(JsonValue::Null),
            Payload::Text(s) => JsonValue::String(s.clone()),
            Payload::Raw(v) => v.clone(),
        }
    }
}

/// (org, repo, relative path) addressing used by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath<'a> {
    pub org: &'a str,
    pub repo: &'a str,
    pub path: Option<&'a str>,
}

impl<'a> RepoPath<'a> {
    pub fn new(org: &'a str, repo: &'a str, path: Option<&'a str>) -> Self {
        Self { org, repo, path }
    }

    /// Path segments in order; empty segments in the relative path are
    /// dropped so an empty path resolves to the repository root.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        [self.org, self.repo]
            .into_iter()
            .chain(self.path.unwrap_or_default().split('/'))
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSourcesResponse {
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub repo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContent {
    pub path: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Body of create/update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBody<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<&'a str>,
}

/// Body of copy/move requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody<'a> {
    pub source_path: &'a str,
    pub destination_path: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaReference {
    pub path: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentReference {
    pub path: String,
    pub fragment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Uniform result of every mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Remote content repository. `DaAdminClient` is the HTTP implementation;
/// tests substitute in-memory stubs.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_sources(&self, org: &str, repo: &str, path: Option<&str>) -> ApiResult<Payload<ListSourcesResponse>>;
    async fn get_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<SourceContent>>;
    async fn create_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>>;
    async fn update_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>>;
    async fn delete_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<OperationResponse>>;
    async fn copy_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>>;
    async fn move_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>>;
    async fn get_versions(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<VersionsResponse>>;
    async fn get_config(&self, org: &str, repo: &str, config_path: Option<&str>) -> ApiResult<Payload<ConfigDocument>>;
    async fn update_config(
        &self,
        org: &str,
        repo: &str,
        config: &ConfigDocument,
        config_path: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>>;
    async fn lookup_media(&self, org: &str, repo: &str, media_path: &str) -> ApiResult<Payload<MediaReference>>;
    async fn lookup_fragment(&self, org: &str, repo: &str, fragment_path: &str) -> ApiResult<Payload<FragmentReference>>;
}
