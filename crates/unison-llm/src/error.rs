use thiserror::Error;

use crate::types::ToolCall;

/// Errors that abort the current call attempt
#[derive(Debug, Error)]
pub enum LlmError {
    /// A declared response model or tool set is inconsistent with its function
    ///
    /// Raised once, when the response model is bound, before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `construct_call_response` was called before the stream was exhausted
    #[error("stream misuse: {0}")]
    StreamMisuse(&'static str),

    /// A raw provider payload could not be decoded into its wire type
    #[error("failed to decode {provider} payload: {source}")]
    Decode {
        /// Wire format being decoded
        provider: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Structured output could not be extracted from a response
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The underlying chunk source reported a failure mid-stream
    #[error("streaming error: {0}")]
    Streaming(String),
}

impl LlmError {
    /// Whether this error terminates the call attempt regardless of caller policy
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::StreamMisuse(_))
    }
}

/// A location inside a tool's argument object that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    /// Dotted path to the offending value (e.g. `book.authors[1]`)
    pub path: String,
    /// What was expected at that path
    pub message: String,
}

impl SchemaViolation {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Per-tool-call failure, reported as data next to successful matches
///
/// None of these variants abort normalization of the surrounding response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Argument text was not a JSON object
    #[error("tool call `{}` ({}) has malformed arguments: {reason}", .tool_call.id, .tool_call.function.name)]
    MalformedArguments {
        /// The raw call as returned by the provider
        tool_call: ToolCall,
        /// Parser message
        reason: String,
    },

    /// Arguments parsed but do not satisfy the declared schema
    #[error("tool call `{}` ({}) failed validation: {violation}", .tool_call.id, .tool_call.function.name)]
    InvalidArguments {
        /// The raw call as returned by the provider
        tool_call: ToolCall,
        /// First violation found
        violation: SchemaViolation,
    },

    /// Call names a tool that was never declared (strict policy only)
    #[error("tool call `{}` invokes undeclared tool `{}`", .tool_call.id, .tool_call.function.name)]
    UnmatchedTool {
        /// The raw call as returned by the provider
        tool_call: ToolCall,
    },
}

impl ToolError {
    /// The raw tool call this error is attached to
    pub const fn tool_call(&self) -> &ToolCall {
        match self {
            Self::MalformedArguments { tool_call, .. }
            | Self::InvalidArguments { tool_call, .. }
            | Self::UnmatchedTool { tool_call } => tool_call,
        }
    }
}
