//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

// -- Message params --

/// Anthropic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role ("user" or "assistant")
    pub role: String,
    /// Content blocks
    pub content: AnthropicContent,
}

/// Anthropic content can be a string or array of content blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Plain text (shorthand)
    Text(String),
    /// Array of content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

/// Content block in an Anthropic message or response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Tool use request from the assistant
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
    /// Tool result from the user
    ToolResult {
        /// Tool use ID this result responds to
        tool_use_id: String,
        /// Result content
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Whether the tool call errored
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Extended thinking from the assistant
    Thinking {
        /// Reasoning text
        thinking: String,
        /// Signature that must be echoed back with the block
        #[serde(default)]
        signature: String,
    },
    /// Thinking redacted by the provider's safety systems
    RedactedThinking {
        /// Encrypted thinking payload
        data: String,
    },
}

// -- Response types --

/// Anthropic messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "message")
    #[serde(rename = "type", default = "message_type")]
    pub response_type: String,
    /// Role (always "assistant")
    pub role: String,
    /// Response content blocks
    pub content: Vec<AnthropicContentBlock>,
    /// Model used
    pub model: String,
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence that triggered the stop
    #[serde(default)]
    pub stop_sequence: Option<String>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

pub(crate) fn message_type() -> String {
    "message".to_owned()
}

/// Anthropic token usage
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnthropicUsage {
    /// Input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

// -- Streaming types --

/// Anthropic SSE event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamEvent {
    /// Stream started
    MessageStart {
        /// Partial message with metadata
        message: AnthropicStreamMessage,
    },
    /// New content block started
    ContentBlockStart {
        /// Block index
        index: u32,
        /// Initial block content
        content_block: AnthropicStreamContentBlock,
    },
    /// Incremental content within a block
    ContentBlockDelta {
        /// Block index
        index: u32,
        /// Delta content
        delta: AnthropicStreamDelta,
    },
    /// Content block finished
    ContentBlockStop {
        /// Block index
        index: u32,
    },
    /// Message metadata delta (stop reason, usage)
    MessageDelta {
        /// Delta with stop reason
        delta: AnthropicMessageDelta,
        /// Updated usage
        #[serde(default)]
        usage: Option<AnthropicUsage>,
    },
    /// Stream completed
    MessageStop,
    /// Ping event for keep-alive
    Ping,
    /// Error reported mid-stream (e.g. `overloaded_error`)
    Error {
        /// Error details
        error: AnthropicStreamError,
    },
}

/// Error payload of an `error` stream event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicStreamError {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Partial message in a `message_start` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicStreamMessage {
    /// Response identifier
    pub id: String,
    /// Role
    #[serde(default)]
    pub role: String,
    /// Model
    pub model: String,
    /// Initial usage
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// Content block in a `content_block_start` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamContentBlock {
    /// Text block
    Text {
        /// Initial text (usually empty)
        #[serde(default)]
        text: String,
    },
    /// Tool use block
    ToolUse {
        /// Tool use ID
        id: String,
        /// Tool name
        name: String,
    },
    /// Extended thinking block
    Thinking {
        /// Initial thinking text (usually empty)
        #[serde(default)]
        thinking: String,
    },
    /// Redacted thinking block
    RedactedThinking {
        /// Encrypted thinking payload
        data: String,
    },
}

/// Delta content in a `content_block_delta` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamDelta {
    /// Incremental text
    TextDelta {
        /// Text fragment
        text: String,
    },
    /// Incremental tool input JSON
    InputJsonDelta {
        /// JSON fragment
        partial_json: String,
    },
    /// Incremental thinking text
    ThinkingDelta {
        /// Thinking fragment
        thinking: String,
    },
    /// Signature closing a thinking block
    SignatureDelta {
        /// Block signature
        signature: String,
    },
}

/// Delta in a `message_delta` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessageDelta {
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence
    #[serde(default)]
    pub stop_sequence: Option<String>,
}
