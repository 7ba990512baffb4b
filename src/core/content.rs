//! Tool-call result envelope (`{ content, structuredContent?, isError? }`).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Informational text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![ContentItem::Text { text: text.into() }], structured_content: None, is_error: None }
    }

    /// Structured result: pretty-printed for the text channel and carried
    /// verbatim as `structuredContent`. Bare strings stay plain text.
    pub fn json(value: JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::text(s),
            other => {
                let text = serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string());
                Self {
                    content: vec![ContentItem::Text { text }],
                    structured_content: Some(other),
                    is_error: None,
                }
            }
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { is_error: Some(true), ..Self::text(message) }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// First text item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().map(|ContentItem::Text { text }| text.as_str()).next()
    }
}
