//! Tool calling definitions exchanged with the function-calling provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Object-type JSON Schema node describing a callable's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub schema_type: String, // "object"
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    /// Further keywords (e.g. `additionalProperties`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParametersSchema {
    pub fn new(properties: Map<String, Value>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required,
            extra: Map::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Schema describing one callable's invocable interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

impl ToolSchema {
    /// Wrap as the provider's `{"type": "function", "function": {...}}` tool entry.
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: self.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.to_definition()).unwrap_or(Value::Null)
    }
}

/// Tool definition (for function calling)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: ToolSchema,
}

/// Tool call (invocation from model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Tool result (response to tool call)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: Value,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, content: Value) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
            is_error: false,
        }
    }

    pub fn failure(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: Value::String(message.into()),
            is_error: true,
        }
    }
}
