use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::core::content::ToolResult;
use crate::core::error::ApiError;
use crate::domain::{ConfigDocument, ContentRepository};
use crate::tools::catalogue::ToolName;

/// Maps `tools/call` invocations onto the content repository.
#[derive(Clone)]
pub struct ToolDispatcher {
    repo: Arc<dyn ContentRepository>,
}

/// Arguments that passed validation against the tool's descriptor.
/// `None` stands for absent (`null`) arguments.
struct Args<'a>(Option<&'a Map<String, JsonValue>>);

impl<'a> Args<'a> {
    fn validate(tool: ToolName, raw: &'a JsonValue) -> Result<Self, String> {
        let args = match raw {
            JsonValue::Object(map) => Self(Some(map)),
            JsonValue::Null => Self(None),
            _ => return Err("arguments must be an object".into()),
        };
        for param in tool.descriptor().params {
            match args.get(param.name) {
                None if param.required => return Err(format!("missing required field '{}'", param.name)),
                None => {}
                Some(v) if !param.kind.matches(v) => {
                    return Err(format!("field '{}' must be of type {}", param.name, param.kind.as_str()))
                }
                // File content may legitimately be empty; addressing fields must
                // name at least one segment or they collapse onto the repository root.
                Some(JsonValue::String(s)) if param.required && param.name != "content" && !names_a_segment(s) => {
                    return Err(format!("field '{}' must not be empty", param.name))
                }
                Some(_) => {}
            }
        }
        Ok(args)
    }

    fn get(&self, key: &str) -> Option<&'a JsonValue> {
        self.0.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    fn opt(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    fn str(&self, key: &str) -> &'a str {
        self.opt(key).unwrap_or_default()
    }

    fn object(&self, key: &str) -> Option<&'a ConfigDocument> {
        self.get(key).and_then(JsonValue::as_object)
    }
}

fn names_a_segment(s: &str) -> bool {
    s.split('/').any(|seg| !seg.trim().is_empty())
}

impl ToolDispatcher {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Unknown tools and invalid arguments come back as `isError` results;
    /// remote failures propagate as `ApiError`.
    pub async fn call(&self, name: &str, arguments: &JsonValue) -> Result<ToolResult, ApiError> {
        let Some(tool) = ToolName::parse(name) else {
            tracing::warn!(tool = name, "unknown tool");
            return Ok(ToolResult::error(format!("Unknown tool: {name}")));
        };
        let args = match Args::validate(tool, arguments) {
            Ok(args) => args,
            Err(reason) => {
                tracing::warn!(tool = name, reason = %reason, "rejected tool arguments");
                return Ok(ToolResult::error(format!("Invalid arguments for {name}: {reason}")));
            }
        };
        tracing::debug!(tool = name, "dispatching tool call");
        let value = self.invoke(tool, &args).await?;
        Ok(ToolResult::json(value))
    }

    async fn invoke(&self, tool: ToolName, args: &Args<'_>) -> Result<JsonValue, ApiError> {
        let r = self.repo.as_ref();
        let (org, repo) = (args.str("org"), args.str("repo"));
        let value = match tool {
            ToolName::ListSources => r.list_sources(org, repo, args.opt("path")).await?.to_json(),
            ToolName::GetSource => r.get_source(org, repo, args.str("path")).await?.to_json(),
            ToolName::CreateSource => r
                .create_source(org, repo, args.str("path"), args.str("content"), args.opt("contentType"))
                .await?
                .to_json(),
            ToolName::UpdateSource => r
                .update_source(org, repo, args.str("path"), args.str("content"), args.opt("contentType"))
                .await?
                .to_json(),
            ToolName::DeleteSource => r.delete_source(org, repo, args.str("path")).await?.to_json(),
            ToolName::CopyContent => r
                .copy_content(org, repo, args.str("sourcePath"), args.str("destinationPath"))
                .await?
                .to_json(),
            ToolName::MoveContent => r
                .move_content(org, repo, args.str("sourcePath"), args.str("destinationPath"))
                .await?
                .to_json(),
            ToolName::GetVersions => r.get_versions(org, repo, args.str("path")).await?.to_json(),
            ToolName::GetConfig => r.get_config(org, repo, args.opt("configPath")).await?.to_json(),
            ToolName::UpdateConfig => {
                let empty = ConfigDocument::new();
                let config = args.object("config").unwrap_or(&empty);
                r.update_config(org, repo, config, args.opt("configPath")).await?.to_json()
            }
            ToolName::LookupMedia => r.lookup_media(org, repo, args.str("mediaPath")).await?.to_json(),
            ToolName::LookupFragment => r.lookup_fragment(org, repo, args.str("fragmentPath")).await?.to_json(),
        };
        Ok(value)
    }
}
