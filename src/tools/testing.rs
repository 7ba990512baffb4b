//! In-memory repositories for exercising the dispatch and protocol layers.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::core::error::ApiError;
use crate::domain::{
    ApiResult, ConfigDocument, ContentRepository, FragmentReference, ListSourcesResponse, MediaReference,
    OperationResponse, Payload, SourceContent, SourceKind, SourceRecord, VersionRecord, VersionsResponse,
};

fn key(org: &str, repo: &str, path: &str) -> String {
    format!("{org}/{repo}/{}", path.trim_matches('/'))
}

fn done(path: &str) -> ApiResult<Payload<OperationResponse>> {
    Ok(Payload::Json(OperationResponse { success: true, message: None, path: Some(path.to_string()) }))
}

fn not_found() -> ApiError {
    ApiError::Remote { status: 404, message: "not found".into(), details: Some(json!({"message": "not found"})) }
}

/// Keeps sources and configs in memory and echoes stored state back.
#[derive(Default)]
pub struct MemoryRepo {
    sources: Mutex<BTreeMap<String, SourceContent>>,
    configs: Mutex<BTreeMap<String, ConfigDocument>>,
}

impl MemoryRepo {
    fn put(&self, org: &str, repo: &str, path: &str, content: &str, content_type: Option<&str>) {
        let record = SourceContent {
            path: path.to_string(),
            content: content.to_string(),
            content_type: content_type.map(str::to_owned),
            last_modified: None,
            etag: None,
        };
        self.sources.lock().unwrap().insert(key(org, repo, path), record);
    }

    fn fetch(&self, org: &str, repo: &str, path: &str) -> ApiResult<SourceContent> {
        self.sources.lock().unwrap().get(&key(org, repo, path)).cloned().ok_or_else(not_found)
    }
}

#[async_trait]
impl ContentRepository for MemoryRepo {
    async fn list_sources(&self, org: &str, repo: &str, path: Option<&str>) -> ApiResult<Payload<ListSourcesResponse>> {
        let prefix = key(org, repo, path.unwrap_or_default());
        let sources = self
            .sources
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, s)| SourceRecord {
                name: s.path.rsplit('/').next().unwrap_or_default().to_string(),
                path: s.path.clone(),
                kind: SourceKind::File,
                last_modified: None,
                size: Some(s.content.len() as u64),
            })
            .collect();
        Ok(Payload::Json(ListSourcesResponse {
            sources,
            path: path.unwrap_or_default().to_string(),
            org: org.to_string(),
            repo: repo.to_string(),
        }))
    }

    async fn get_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<SourceContent>> {
        self.fetch(org, repo, path).map(Payload::Json)
    }

    async fn create_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        self.put(org, repo, path, content, content_type);
        done(path)
    }

    async fn update_source(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        self.fetch(org, repo, path)?;
        self.put(org, repo, path, content, content_type);
        done(path)
    }

    async fn delete_source(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<OperationResponse>> {
        self.sources.lock().unwrap().remove(&key(org, repo, path)).ok_or_else(not_found)?;
        done(path)
    }

    async fn copy_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>> {
        let src = self.fetch(org, repo, source_path)?;
        self.put(org, repo, destination_path, &src.content, src.content_type.as_deref());
        done(destination_path)
    }

    async fn move_content(
        &self,
        org: &str,
        repo: &str,
        source_path: &str,
        destination_path: &str,
    ) -> ApiResult<Payload<OperationResponse>> {
        let src = self.fetch(org, repo, source_path)?;
        self.sources.lock().unwrap().remove(&key(org, repo, source_path));
        self.put(org, repo, destination_path, &src.content, src.content_type.as_deref());
        done(destination_path)
    }

    async fn get_versions(&self, org: &str, repo: &str, path: &str) -> ApiResult<Payload<VersionsResponse>> {
        self.fetch(org, repo, path)?;
        Ok(Payload::Json(VersionsResponse {
            versions: vec![VersionRecord {
                version: "v1".into(),
                timestamp: "2024-01-01T00:00:00Z".into(),
                author: None,
                message: None,
            }],
            path: path.to_string(),
        }))
    }

    async fn get_config(&self, org: &str, repo: &str, config_path: Option<&str>) -> ApiResult<Payload<ConfigDocument>> {
        let k = key(org, repo, config_path.unwrap_or_default());
        Ok(Payload::Json(self.configs.lock().unwrap().get(&k).cloned().unwrap_or_default()))
    }

    async fn update_config(
        &self,
        org: &str,
        repo: &str,
        config: &ConfigDocument,
        config_path: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        let path = config_path.unwrap_or_default();
        self.configs.lock().unwrap().insert(key(org, repo, path), config.clone());
        done(path)
    }

    async fn lookup_media(&self, _org: &str, _repo: &str, media_path: &str) -> ApiResult<Payload<MediaReference>> {
        Ok(Payload::Json(MediaReference {
            path: media_path.to_string(),
            url: format!("https://cdn.example/{media_path}"),
            alt: None,
            width: None,
            height: None,
        }))
    }

    async fn lookup_fragment(&self, org: &str, repo: &str, fragment_path: &str) -> ApiResult<Payload<FragmentReference>> {
        let content = self.fetch(org, repo, fragment_path).ok().map(|s| s.content);
        Ok(Payload::Json(FragmentReference {
            path: fragment_path.to_string(),
            fragment: fragment_path.to_string(),
            content,
        }))
    }
}

/// Fails every call with the same error, optionally after a delay.
pub struct FailingRepo {
    status: u16,
    message: &'static str,
    delay: Duration,
}

impl FailingRepo {
    pub fn remote(status: u16, message: &'static str) -> Self {
        Self { status, message, delay: Duration::ZERO }
    }

    pub fn timeout_after(delay: Duration) -> Self {
        Self { status: 408, message: "Request timeout", delay }
    }

    async fn fail<T>(&self) -> ApiResult<T> {
        tokio::time::sleep(self.delay).await;
        if self.status == 408 {
            return Err(ApiError::Timeout);
        }
        Err(ApiError::Remote { status: self.status, message: self.message.into(), details: None })
    }
}

#[async_trait]
impl ContentRepository for FailingRepo {
    async fn list_sources(&self, _: &str, _: &str, _: Option<&str>) -> ApiResult<Payload<ListSourcesResponse>> {
        self.fail().await
    }
    async fn get_source(&self, _: &str, _: &str, _: &str) -> ApiResult<Payload<SourceContent>> {
        self.fail().await
    }
    async fn create_source(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn update_source(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn delete_source(&self, _: &str, _: &str, _: &str) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn copy_content(&self, _: &str, _: &str, _: &str, _: &str) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn move_content(&self, _: &str, _: &str, _: &str, _: &str) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn get_versions(&self, _: &str, _: &str, _: &str) -> ApiResult<Payload<VersionsResponse>> {
        self.fail().await
    }
    async fn get_config(&self, _: &str, _: &str, _: Option<&str>) -> ApiResult<Payload<ConfigDocument>> {
        self.fail().await
    }
    async fn update_config(
        &self,
        _: &str,
        _: &str,
        _: &ConfigDocument,
        _: Option<&str>,
    ) -> ApiResult<Payload<OperationResponse>> {
        self.fail().await
    }
    async fn lookup_media(&self, _: &str, _: &str, _: &str) -> ApiResult<Payload<MediaReference>> {
        self.fail().await
    }
    async fn lookup_fragment(&self, _: &str, _: &str, _: &str) -> ApiResult<Payload<FragmentReference>> {
        self.fail().await
    }
}
