use serde_json::{json, Map, Value as JsonValue};

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Object,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Object => "object",
        }
    }

    pub fn matches(self, value: &JsonValue) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub required: bool,
}

/// Immutable metadata for one tool, rendered into `tools/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    pub fn required(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// JSON Schema object for the tool arguments.
    pub fn input_schema(&self) -> JsonValue {
        let mut properties = Map::new();
        for p in self.params {
            properties.insert(
                p.name.to_string(),
                json!({ "type": p.kind.as_str(), "description": p.description }),
            );
        }
        let required: Vec<&str> = self.required().map(|p| p.name).collect();
        json!({ "type": "object", "properties": properties, "required": required })
    }

    pub fn to_json(&self) -> JsonValue {
        json!({ "name": self.name, "description": self.description, "inputSchema": self.input_schema() })
    }
}
