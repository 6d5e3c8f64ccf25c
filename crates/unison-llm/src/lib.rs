//! Cross-provider LLM response normalization for Unison
//!
//! Decodes complete responses and stream chunks from the `OpenAI`, Anthropic,
//! Google, Mistral, Cohere and Bedrock wire formats into one uniform view:
//! text content, finish reasons, usage and cost, raw tool calls, and tool calls
//! matched and validated against the tools the call declared. Responses can be
//! turned back into provider-native history entries for the follow-up turn, and
//! structured output can be extracted through a [`ResponseModel`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod history;
pub mod pricing;
pub mod protocol;
pub mod response;
pub mod response_model;
pub mod schema;
pub mod stream;
pub mod tools;
pub mod types;

pub use convert::ResponseAdapter;
pub use error::{LlmError, SchemaViolation, ToolError};
pub use history::MessageHistory;
pub use pricing::{ModelPrice, PriceTable};
pub use response::{CallResponse, NormalizeOptions, ResponseSummary, ToolSummary};
pub use response_model::{BoundResponseModel, ResponseModel};
pub use schema::{Field, FieldType, ToolSchema};
pub use stream::{BlockingCallStream, CallStream, ChunkAdapter, StreamReassembler, StreamSnapshot};
pub use tools::{Tool, ToolInstance, ToolMatchPolicy, ToolOutcome};
pub use types::{CallParams, Provider, StreamChunk, ToolCall, ToolChoice, Usage, WireFormat};
