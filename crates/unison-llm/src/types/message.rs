use serde::{Deserialize, Serialize};

/// A tool/function call requested by the assistant, as returned by the provider
///
/// Provider-native calls are lowered into this shape before matching. The
/// arguments are kept as the raw text the model produced so malformed JSON can
/// be reported instead of lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name and arguments of the function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Build a tool call from raw parts
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Raw argument text
    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }
}

/// Function name and arguments within a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// Serialize a provider's structured tool input back to argument text
///
/// Anthropic, Google and Bedrock hand back parsed JSON rather than text.
pub(crate) fn arguments_to_text(input: &serde_json::Value) -> String {
    match input {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parse argument text into JSON for providers that expect structured input
///
/// Text that does not parse is kept verbatim as a JSON string, so
/// [`arguments_to_text`] hands the malformed text back unchanged.
pub(crate) fn arguments_to_value(arguments: &str) -> serde_json::Value {
    if arguments.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(arguments).unwrap_or_else(|_| serde_json::Value::String(arguments.to_owned()))
}
