use serde::{Deserialize, Serialize};

use super::response::Usage;

/// One normalized unit of a streaming response
///
/// Produced for every raw provider chunk, in arrival order. Fields the chunk
/// did not carry are left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental text for the primary choice (empty when none)
    pub content: String,
    /// Reason generation stopped, on the chunk that carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Usage snapshot, on chunks that carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Partial tool call data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallFragment>,
    /// Response identifier, when the chunk carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model identifier, when the chunk carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl StreamChunk {
    /// Chunk carrying only a text delta
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Partial tool call data within a stream chunk
///
/// Fragments sharing an `index` belong to the same call; `arguments` pieces are
/// concatenated in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallFragment {
    /// Position of the call within the response's tool calls
    pub index: u32,
    /// Tool call ID (first fragment only, on most providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name (first fragment only, on most providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Incremental arguments JSON fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}
