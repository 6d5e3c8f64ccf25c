//! Provider-agnostic types shared by every wire format
//!
//! Wire-specific shapes live in [`crate::protocol`]; the adapters in
//! [`crate::convert`] lower them into these.

pub mod message;
pub mod provider;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use message::{FunctionCall, ToolCall};
pub use provider::{Provider, WireFormat};
pub use request::CallParams;
pub use response::Usage;
pub use stream::{StreamChunk, ToolCallFragment};
pub use tool::{FunctionDefinition, ToolChoice};
