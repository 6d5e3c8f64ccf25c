use serde::{Deserialize, Serialize};

/// Provider-agnostic function schema produced by the schema bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description (empty when none was declared)
    pub description: String,
    /// JSON Schema for the function parameters
    pub parameters: serde_json::Value,
}

/// How the model should select tools
///
/// Each wire format lowers this into its own directive (`tool_choice`,
/// `toolChoice`, `function_calling_config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model will not call any tools
    None,
    /// Model decides whether to call tools
    Auto,
    /// Model must call at least one tool
    Required,
    /// Model must call exactly this tool
    Tool(String),
}
