//! Provider-native message params for multi-turn tool use
//!
//! After a response requests tools, the caller appends the assistant turn
//! ([`MessageHistory::message_param`]) and the tool results
//! ([`MessageHistory::tool_message_params`]) to the conversation and calls the
//! model again. Each format has its own shape for both.

use std::fmt::Debug;

use serde::Serialize;

use crate::convert::ResponseAdapter;
use crate::tools::ToolInstance;

/// Conversion of a response and its tool outputs into history entries
pub trait MessageHistory: ResponseAdapter {
    /// One entry in this format's `messages` / `contents` list
    type MessageParam: Serialize + Clone + Debug + Send + Sync;

    /// The first choice as a prior assistant turn, including its tool calls
    fn message_param(&self) -> Self::MessageParam;

    /// Tool outputs in the shape this format expects after a tool-calling turn
    ///
    /// Every result carries the id of the call it answers. Formats that group
    /// results into a single user turn return one entry; an empty input
    /// returns no entries.
    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<Self::MessageParam>;
}
