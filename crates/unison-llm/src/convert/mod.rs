//! Per-wire-format adapters
//!
//! Each submodule lowers one provider protocol into the uniform model: a
//! [`ResponseAdapter`] on the complete response, a
//! [`MessageHistory`](crate::history::MessageHistory) for multi-turn tool use, a
//! [`ChunkAdapter`](crate::stream::ChunkAdapter) for streams, and the tool
//! schema lowering used by the outbound request builder.

pub mod anthropic;
pub mod bedrock;
pub mod cohere;
pub mod google;
pub mod mistral;
pub mod openai;

use std::fmt::Debug;

use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::types::{ToolCall, Usage, WireFormat};

/// Uniform read access to one wire format's complete response
///
/// Accessors that describe "the" message read the first choice only;
/// [`finish_reasons`](Self::finish_reasons) covers every choice.
pub trait ResponseAdapter: DeserializeOwned + Clone + Debug + Send + Sync {
    /// Wire format this response decodes from
    const FORMAT: WireFormat;

    /// Text of the first choice
    ///
    /// When content is a list of parts, the first text part is returned and
    /// later parts are ignored. Empty when there is no text.
    fn content(&self) -> String;

    /// One entry per choice; empty string where the provider gave no reason
    fn finish_reasons(&self) -> Vec<String>;

    /// Token usage, `None` when the provider reported none
    fn usage(&self) -> Option<Usage>;

    /// Model identifier reported by the provider
    fn model(&self) -> Option<&str>;

    /// Response identifier reported by the provider
    fn id(&self) -> Option<&str>;

    /// Raw tool calls of the first choice, in provider order
    fn tool_calls(&self) -> Vec<ToolCall>;

    /// Decode a raw JSON payload
    fn decode(raw: &str) -> Result<Self, LlmError> {
        serde_json::from_str(raw).map_err(|source| LlmError::Decode {
            provider: Self::FORMAT.into(),
            source,
        })
    }

    /// Decode an already-parsed JSON value
    fn decode_value(value: serde_json::Value) -> Result<Self, LlmError> {
        serde_json::from_value(value).map_err(|source| LlmError::Decode {
            provider: Self::FORMAT.into(),
            source,
        })
    }
}

/// `Some(text)` unless `text` is empty
pub(crate) fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

/// Identifier for a tool call the provider left unnamed
pub(crate) fn fallback_call_id(index: impl std::fmt::Display) -> String {
    format!("call_{index}")
}
