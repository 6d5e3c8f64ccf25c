//! Cohere v2 chat API wire format types

use serde::{Deserialize, Serialize};

/// Cohere v2 message within a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereMessage {
    /// Role ("user", "assistant", "system" or "tool")
    pub role: String,
    /// Content (string or list of content items)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CohereContent>,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<CohereToolCall>>,
    /// Reasoning emitted before the tool calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_plan: Option<String>,
    /// Tool call ID this message responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Cohere content is a string or a list of typed items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CohereContent {
    /// Plain text
    Text(String),
    /// List of content items
    Items(Vec<CohereContentItem>),
}

/// Typed content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CohereContentItem {
    /// Text item
    Text {
        /// The text string
        text: String,
    },
    /// Document item, used for tool results
    Document {
        /// Document payload
        document: serde_json::Value,
    },
}

/// Cohere v2 tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohereToolCall {
    /// Tool call identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool type ("function")
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    /// Function call details
    pub function: CohereFunctionCall,
}

fn function_type() -> String {
    "function".to_owned()
}

/// Function name and JSON-encoded arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohereFunctionCall {
    /// Function name
    #[serde(default)]
    pub name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    pub arguments: String,
}

// -- Response types --

/// Cohere v2 chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereResponse {
    /// Response identifier
    pub id: String,
    /// Why generation stopped (e.g. `COMPLETE`, `TOOL_CALL`)
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Generated message
    pub message: CohereMessage,
    /// Billing and token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CohereUsage>,
}

/// Cohere usage block
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CohereUsage {
    /// Units billed for the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_units: Option<CohereBilledUnits>,
    /// Raw token counts (include prompt template tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<CohereTokens>,
}

/// Billed input and output units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CohereBilledUnits {
    /// Billed input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<f64>,
    /// Billed output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<f64>,
}

/// Raw token counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CohereTokens {
    /// Input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<f64>,
    /// Output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<f64>,
}

// -- Streaming types --

/// Cohere v2 stream event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CohereStreamEvent {
    /// Stream started
    MessageStart {
        /// Response identifier
        #[serde(default)]
        id: Option<String>,
    },
    /// Content item started
    ContentStart {
        /// Content index
        #[serde(default)]
        index: u32,
    },
    /// Incremental content
    ContentDelta {
        /// Content index
        #[serde(default)]
        index: u32,
        /// Delta payload
        delta: CohereStreamDelta,
    },
    /// Content item finished
    ContentEnd {
        /// Content index
        #[serde(default)]
        index: u32,
    },
    /// Incremental tool plan text
    ToolPlanDelta {
        /// Delta payload
        delta: CohereStreamDelta,
    },
    /// Tool call started; carries id and name
    ToolCallStart {
        /// Tool call index
        #[serde(default)]
        index: u32,
        /// Delta payload
        delta: CohereStreamDelta,
    },
    /// Incremental tool arguments
    ToolCallDelta {
        /// Tool call index
        #[serde(default)]
        index: u32,
        /// Delta payload
        delta: CohereStreamDelta,
    },
    /// Tool call finished
    ToolCallEnd {
        /// Tool call index
        #[serde(default)]
        index: u32,
    },
    /// Citation events (ignored)
    CitationStart {},
    /// Citation events (ignored)
    CitationEnd {},
    /// Stream finished
    MessageEnd {
        /// Final delta with finish reason and usage
        delta: CohereMessageEndDelta,
    },
}

/// Delta payload for content and tool events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereStreamDelta {
    /// Partial message
    #[serde(default)]
    pub message: CohereStreamDeltaMessage,
}

/// Partial message inside a stream delta
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereStreamDeltaMessage {
    /// Content delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CohereStreamContent>,
    /// Tool plan delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_plan: Option<String>,
    /// Tool call delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<CohereStreamToolCall>,
}

/// Text delta
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereStreamContent {
    /// Text fragment
    #[serde(default)]
    pub text: String,
}

/// Tool call delta
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereStreamToolCall {
    /// Tool call identifier (start event only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Partial function call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<CohereStreamFunctionCall>,
}

/// Partial function call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereStreamFunctionCall {
    /// Function name (start event only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Delta on the `message-end` event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohereMessageEndDelta {
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Final usage
    #[serde(default)]
    pub usage: Option<CohereUsage>,
}
