//! AWS Bedrock Converse API wire format types
//!
//! These mirror the JSON documents the Converse and `ConverseStream`
//! operations exchange, so responses captured from the REST API or an SDK's
//! JSON serialization decode directly.

use serde::{Deserialize, Serialize};

/// Converse message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockMessage {
    /// Role ("user" or "assistant")
    pub role: String,
    /// Content blocks
    pub content: Vec<BedrockContentBlock>,
}

/// Content block; exactly one member is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BedrockContentBlock {
    /// Text
    Text(String),
    /// Tool invocation from the assistant
    ToolUse(BedrockToolUse),
    /// Tool output from the user
    ToolResult(BedrockToolResult),
}

/// Tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockToolUse {
    /// Tool use identifier
    pub tool_use_id: String,
    /// Tool name
    pub name: String,
    /// Tool input document
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockToolResult {
    /// Tool use this result answers
    pub tool_use_id: String,
    /// Result content
    pub content: Vec<BedrockToolResultContent>,
    /// "success" or "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Tool result content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BedrockToolResultContent {
    /// Text result
    Text(String),
    /// JSON result
    Json(serde_json::Value),
}

// -- Response types --

/// Converse response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockResponse {
    /// Output container
    pub output: BedrockOutput,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<BedrockUsage>,
    /// Latency metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BedrockMetrics>,
}

/// Converse output union; only `message` is defined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockOutput {
    /// Generated message
    pub message: BedrockMessage,
}

/// Token usage
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockUsage {
    /// Input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Total tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

/// Latency metrics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockMetrics {
    /// Server-side latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

// -- Streaming types --

/// `ConverseStream` event; each event is a single-key object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BedrockStreamEvent {
    /// Stream started
    MessageStart(BedrockMessageStart),
    /// Content block started (tool use blocks only carry a start)
    ContentBlockStart(BedrockContentBlockStart),
    /// Incremental block content
    ContentBlockDelta(BedrockContentBlockDelta),
    /// Content block finished
    ContentBlockStop(BedrockContentBlockStop),
    /// Generation stopped
    MessageStop(BedrockMessageStop),
    /// Trailing usage and metrics
    Metadata(BedrockStreamMetadata),
}

/// Payload of `messageStart`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockMessageStart {
    /// Role of the generated message
    pub role: String,
}

/// Payload of `contentBlockStart`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockContentBlockStart {
    /// Block index
    pub content_block_index: u32,
    /// Block start
    pub start: BedrockBlockStart,
}

/// Start of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BedrockBlockStart {
    /// Tool use block
    ToolUse(BedrockToolUseStart),
}

/// Start of a tool use block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockToolUseStart {
    /// Tool use identifier
    pub tool_use_id: String,
    /// Tool name
    pub name: String,
}

/// Payload of `contentBlockDelta`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockContentBlockDelta {
    /// Block index
    pub content_block_index: u32,
    /// Delta
    pub delta: BedrockBlockDelta,
}

/// Incremental block content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BedrockBlockDelta {
    /// Text fragment
    Text(String),
    /// Tool input fragment
    ToolUse(BedrockToolUseDelta),
}

/// Tool input fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockToolUseDelta {
    /// Partial JSON input
    pub input: String,
}

/// Payload of `contentBlockStop`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockContentBlockStop {
    /// Block index
    pub content_block_index: u32,
}

/// Payload of `messageStop`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockMessageStop {
    /// Why generation stopped
    pub stop_reason: String,
}

/// Payload of `metadata`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockStreamMetadata {
    /// Token usage
    #[serde(default)]
    pub usage: Option<BedrockUsage>,
    /// Latency metrics
    #[serde(default)]
    pub metrics: Option<BedrockMetrics>,
}
