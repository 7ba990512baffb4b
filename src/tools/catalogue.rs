//! The fixed DA Live Admin tool catalogue returned by `tools/list`.

use serde_json::{json, Value as JsonValue};

use crate::core::tool::{ParamSpec, ParamType, ToolDescriptor};

/// Closed set of tool names; anything else is an unknown tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListSources,
    GetSource,
    CreateSource,
    UpdateSource,
    DeleteSource,
    CopyContent,
    MoveContent,
    GetVersions,
    GetConfig,
    UpdateConfig,
    LookupMedia,
    LookupFragment,
}

impl ToolName {
    pub const ALL: [ToolName; 12] = [
        ToolName::ListSources,
        ToolName::GetSource,
        ToolName::CreateSource,
        ToolName::UpdateSource,
        ToolName::DeleteSource,
        ToolName::CopyContent,
        ToolName::MoveContent,
        ToolName::GetVersions,
        ToolName::GetConfig,
        ToolName::UpdateConfig,
        ToolName::LookupMedia,
        ToolName::LookupFragment,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        self.descriptor().name
    }

    pub fn descriptor(self) -> &'static ToolDescriptor {
        &TOOL_CATALOGUE[self as usize]
    }
}

const fn string(name: &'static str, description: &'static str, required: bool) -> ParamSpec {
    ParamSpec { name, kind: ParamType::String, description, required }
}

const ORG: ParamSpec = string("org", "Organization name (e.g., \"adobe\")", true);
const REPO: ParamSpec = string("repo", "Repository name (e.g., \"my-docs\")", true);

/// Ordered to match `ToolName` discriminants.
pub static TOOL_CATALOGUE: [ToolDescriptor; 12] = [
    ToolDescriptor {
        name: "da_list_sources",
        description: "List all sources and directories in a DA repository at a given path. Returns a list of files and folders with their metadata.",
        params: &[
            ORG,
            REPO,
            string("path", "Optional path within repository (e.g., \"docs/guides\"). Leave empty for root.", false),
        ],
    },
    ToolDescriptor {
        name: "da_get_source",
        description: "Get the content of a specific source file from a DA repository. Returns the file content and metadata.",
        params: &[ORG, REPO, string("path", "Path to the file within the repository (e.g., \"docs/index.md\")", true)],
    },
    ToolDescriptor {
        name: "da_create_source",
        description: "Create a new source file in a DA repository with the specified content.",
        params: &[
            ORG,
            REPO,
            string("path", "Path where the new file should be created (e.g., \"docs/new-page.md\")", true),
            string("content", "Content of the new file", true),
            string("contentType", "Optional content type (e.g., \"text/markdown\", \"text/html\")", false),
        ],
    },
    ToolDescriptor {
        name: "da_update_source",
        description: "Update an existing source file in a DA repository with new content.",
        params: &[
            ORG,
            REPO,
            string("path", "Path to the file to update", true),
            string("content", "New content for the file", true),
            string("contentType", "Optional content type", false),
        ],
    },
    ToolDescriptor {
        name: "da_delete_source",
        description: "Delete a source file from a DA repository. Use with caution as this operation cannot be undone.",
        params: &[ORG, REPO, string("path", "Path to the file to delete", true)],
    },
    ToolDescriptor {
        name: "da_copy_content",
        description: "Copy content from one location to another within a DA repository. Creates a duplicate of the source at the destination.",
        params: &[
            ORG,
            REPO,
            string("sourcePath", "Path to the source file to copy from", true),
            string("destinationPath", "Path where the file should be copied to", true),
        ],
    },
    ToolDescriptor {
        name: "da_move_content",
        description: "Move content from one location to another within a DA repository. The source file will be removed.",
        params: &[
            ORG,
            REPO,
            string("sourcePath", "Path to the source file to move from", true),
            string("destinationPath", "Path where the file should be moved to", true),
        ],
    },
    ToolDescriptor {
        name: "da_get_versions",
        description: "Get version history for a source file in a DA repository. Returns a list of versions with timestamps and metadata.",
        params: &[ORG, REPO, string("path", "Path to the file", true)],
    },
    ToolDescriptor {
        name: "da_get_config",
        description: "Get configuration for a DA repository. Can retrieve global or path-specific configurations.",
        params: &[ORG, REPO, string("configPath", "Optional specific configuration path", false)],
    },
    ToolDescriptor {
        name: "da_update_config",
        description: "Update configuration for a DA repository. Can update global or path-specific configurations.",
        params: &[
            ORG,
            REPO,
            ParamSpec {
                name: "config",
                kind: ParamType::Object,
                description: "Configuration object to update",
                required: true,
            },
            string("configPath", "Optional specific configuration path", false),
        ],
    },
    ToolDescriptor {
        name: "da_lookup_media",
        description: "Lookup media references in a DA repository. Returns information about media assets including URLs and metadata.",
        params: &[ORG, REPO, string("mediaPath", "Path to the media file", true)],
    },
    ToolDescriptor {
        name: "da_lookup_fragment",
        description: "Lookup fragment references in a DA repository. Returns information about content fragments.",
        params: &[ORG, REPO, string("fragmentPath", "Path to the fragment", true)],
    },
];

/// `tools/list` result body.
pub fn tools_list() -> JsonValue {
    let tools: Vec<JsonValue> = TOOL_CATALOGUE.iter().map(ToolDescriptor::to_json).collect();
    json!({ "tools": tools })
}
