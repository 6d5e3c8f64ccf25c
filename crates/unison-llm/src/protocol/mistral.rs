//! Mistral chat API wire format types
//!
//! Close to the `OpenAI` shape, with two differences that matter when
//! normalizing: content may be a list of chunks, and tool arguments may arrive
//! as an object instead of a JSON string.

use serde::{Deserialize, Serialize};

/// Mistral message within a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistralMessage {
    /// Message role
    pub role: String,
    /// Content (string or list of chunks)
    #[serde(default)]
    pub content: Option<MistralContent>,
    /// Tool name, on tool result messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<MistralToolCall>>,
    /// Tool call ID this message responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Mistral content is a string or a list of typed chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MistralContent {
    /// Plain text
    Text(String),
    /// List of content chunks
    Chunks(Vec<MistralContentChunk>),
}

/// Typed chunk within list content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MistralContentChunk {
    /// Text chunk
    Text {
        /// The text string
        text: String,
    },
    /// Image reference
    ImageUrl {
        /// URL or data URI
        image_url: serde_json::Value,
    },
    /// Reference chunk (document citations)
    Reference {
        /// Referenced document ids
        #[serde(default)]
        reference_ids: Vec<serde_json::Value>,
    },
}

/// Mistral tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistralToolCall {
    /// Tool call identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Tool type ("function")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Function call details
    pub function: MistralFunctionCall,
    /// Position of the call, present on streamed deltas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Function name and arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistralFunctionCall {
    /// Function name
    pub name: String,
    /// Arguments as a JSON string or an already-parsed object
    pub arguments: serde_json::Value,
}

// -- Response types --

/// Mistral chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralResponse {
    /// Response identifier
    pub id: String,
    /// Object type
    #[serde(default)]
    pub object: String,
    /// Model used
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created: u64,
    /// Generated choices
    pub choices: Vec<MistralChoice>,
    /// Token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<MistralUsage>,
}

/// Choice within a Mistral response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralChoice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: MistralMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage in a Mistral response
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MistralUsage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

// -- Streaming types --

/// Mistral streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralStreamChunk {
    /// Chunk identifier
    pub id: String,
    /// Model used
    pub model: String,
    /// Delta choices
    #[serde(default)]
    pub choices: Vec<MistralStreamChoice>,
    /// Usage (final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<MistralUsage>,
}

/// Choice within a streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralStreamChoice {
    /// Choice index
    pub index: u32,
    /// Incremental delta
    pub delta: MistralStreamDelta,
    /// Finish reason (final chunk)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content within a streaming choice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MistralStreamDelta {
    /// Role (first chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Incremental content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MistralContent>,
    /// Tool calls; Mistral sends each call whole rather than in fragments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<MistralToolCall>>,
}
