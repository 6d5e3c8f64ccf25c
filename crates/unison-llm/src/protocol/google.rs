//! Google Generative Language / Vertex AI wire format types

use serde::{Deserialize, Serialize};

/// Google content object containing role and parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleContent {
    /// Role ("user" or "model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<GooglePart>,
}

/// Individual part within a Google content object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GooglePart {
    /// Text content
    Text(String),
    /// Inline data (e.g. images)
    InlineData(GoogleInlineData),
    /// Function call from the model
    FunctionCall(GoogleFunctionCall),
    /// Function response from the user
    FunctionResponse(GoogleFunctionResponse),
}

/// Inline binary data (images, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInlineData {
    /// MIME type (e.g. "image/png")
    pub mime_type: String,
    /// Base64-encoded data
    pub data: String,
}

/// Function call from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionCall {
    /// Call identifier (newer API versions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Function arguments as JSON
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Function response from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionResponse {
    /// Identifier of the call this responds to (when the call carried one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    pub name: String,
    /// Response content as JSON
    pub response: serde_json::Value,
}

// -- Response types --

/// Google `generateContent` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    /// Token usage metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GoogleUsageMetadata>,
    /// Concrete model version that served the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    /// Response identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

/// Generated candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCandidate {
    /// Generated content
    #[serde(default)]
    pub content: GoogleContent,
    /// Finish reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Candidate index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Token usage metadata
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsageMetadata {
    /// Prompt token count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<u32>,
    /// Candidates token count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<u32>,
    /// Total token count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u32>,
}

// -- Streaming types --

/// Google streaming response wraps `generateContent` responses line by line
/// Each line is a complete `GoogleResponse` JSON object
pub type GoogleStreamChunk = GoogleResponse;
