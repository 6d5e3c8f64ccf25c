//! Anthropic Messages adapter

use std::collections::HashMap;

use serde_json::{Value, json};

use super::{ResponseAdapter, non_empty};
use crate::history::MessageHistory;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicResponse, AnthropicStreamContentBlock,
    AnthropicStreamDelta, AnthropicStreamEvent, AnthropicUsage, message_type,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::message::{arguments_to_text, arguments_to_value};
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl ResponseAdapter for AnthropicResponse {
    const FORMAT: WireFormat = WireFormat::Anthropic;

    fn content(&self) -> String {
        self.content
            .iter()
            .find_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.clone()),
                AnthropicContentBlock::ToolUse { .. }
                | AnthropicContentBlock::ToolResult { .. }
                | AnthropicContentBlock::Thinking { .. }
                | AnthropicContentBlock::RedactedThinking { .. } => None,
            })
            .unwrap_or_default()
    }

    fn finish_reasons(&self) -> Vec<String> {
        vec![self.stop_reason.clone().unwrap_or_default()]
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.map(|u| Usage::new(u.input_tokens, u.output_tokens, None))
    }

    fn model(&self) -> Option<&str> {
        non_empty(&self.model)
    }

    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::new(id, name, arguments_to_text(input)))
                }
                AnthropicContentBlock::Text { .. }
                | AnthropicContentBlock::ToolResult { .. }
                | AnthropicContentBlock::Thinking { .. }
                | AnthropicContentBlock::RedactedThinking { .. } => None,
            })
            .collect()
    }
}

impl MessageHistory for AnthropicResponse {
    type MessageParam = AnthropicMessage;

    fn message_param(&self) -> AnthropicMessage {
        AnthropicMessage {
            role: "assistant".to_owned(),
            content: AnthropicContent::Blocks(self.content.clone()),
        }
    }

    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<AnthropicMessage> {
        if results.is_empty() {
            return Vec::new();
        }

        let blocks = results
            .iter()
            .map(|(tool, output)| AnthropicContentBlock::ToolResult {
                tool_use_id: tool.id().to_owned(),
                content: Some(output.clone()),
                is_error: None,
            })
            .collect();

        vec![AnthropicMessage {
            role: "user".to_owned(),
            content: AnthropicContent::Blocks(blocks),
        }]
    }
}

/// Chunk adapter for Anthropic event streams
///
/// Content block indices are shared by text and tool-use blocks, so tool calls
/// get their own sequential index. Input token counts arrive on
/// `message_start` and output counts on `message_delta`; both are merged into
/// each usage snapshot.
#[derive(Debug, Default)]
pub struct AnthropicChunkAdapter {
    /// Content block index to tool-call index
    tool_blocks: HashMap<u32, u32>,
    /// Index the next `tool_use` block will get
    next_tool_call_index: u32,
    /// Latest known counts
    usage: AnthropicUsage,
}

impl AnthropicChunkAdapter {
    fn merge_usage(&mut self, usage: AnthropicUsage) -> Usage {
        if usage.input_tokens.is_some() {
            self.usage.input_tokens = usage.input_tokens;
        }
        if usage.output_tokens.is_some() {
            self.usage.output_tokens = usage.output_tokens;
        }
        Usage::new(self.usage.input_tokens, self.usage.output_tokens, None)
    }
}

impl ChunkAdapter for AnthropicChunkAdapter {
    type Chunk = AnthropicStreamEvent;
    type Response = AnthropicResponse;

    fn normalize(&mut self, event: &AnthropicStreamEvent) -> StreamChunk {
        match event {
            AnthropicStreamEvent::MessageStart { message } => StreamChunk {
                id: non_empty(&message.id).map(str::to_owned),
                model: non_empty(&message.model).map(str::to_owned),
                usage: message.usage.map(|u| self.merge_usage(u)),
                ..StreamChunk::default()
            },

            AnthropicStreamEvent::ContentBlockStart { index, content_block } => match content_block {
                AnthropicStreamContentBlock::Text { text } => StreamChunk::text(text.clone()),
                AnthropicStreamContentBlock::ToolUse { id, name } => {
                    let tool_index = self.next_tool_call_index;
                    self.next_tool_call_index += 1;
                    self.tool_blocks.insert(*index, tool_index);

                    StreamChunk {
                        tool_calls: vec![ToolCallFragment {
                            index: tool_index,
                            id: Some(id.clone()),
                            name: Some(name.clone()),
                            arguments: None,
                        }],
                        ..StreamChunk::default()
                    }
                }
                AnthropicStreamContentBlock::Thinking { .. } | AnthropicStreamContentBlock::RedactedThinking { .. } => {
                    StreamChunk::default()
                }
            },

            AnthropicStreamEvent::ContentBlockDelta { index, delta } => match delta {
                AnthropicStreamDelta::TextDelta { text } => StreamChunk::text(text.clone()),
                AnthropicStreamDelta::InputJsonDelta { partial_json } => {
                    let Some(&tool_index) = self.tool_blocks.get(index) else {
                        tracing::debug!(block = index, "input delta for a block that is not a tool use");
                        return StreamChunk::default();
                    };

                    StreamChunk {
                        tool_calls: vec![ToolCallFragment {
                            index: tool_index,
                            id: None,
                            name: None,
                            arguments: Some(partial_json.clone()),
                        }],
                        ..StreamChunk::default()
                    }
                }
                AnthropicStreamDelta::ThinkingDelta { .. } | AnthropicStreamDelta::SignatureDelta { .. } => {
                    StreamChunk::default()
                }
            },

            AnthropicStreamEvent::MessageDelta { delta, usage } => StreamChunk {
                finish_reason: delta.stop_reason.clone(),
                usage: usage.map(|u| self.merge_usage(u)),
                ..StreamChunk::default()
            },

            AnthropicStreamEvent::ContentBlockStop { .. }
            | AnthropicStreamEvent::MessageStop
            | AnthropicStreamEvent::Ping
            | AnthropicStreamEvent::Error { .. } => StreamChunk::default(),
        }
    }

    fn failure(&self, event: &AnthropicStreamEvent) -> Option<String> {
        if let AnthropicStreamEvent::Error { error } = event {
            Some(format!("{}: {}", error.error_type, error.message))
        } else {
            None
        }
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> AnthropicResponse {
        let mut content = Vec::with_capacity(snapshot.tool_calls.len() + 1);

        if !snapshot.content.is_empty() {
            content.push(AnthropicContentBlock::Text {
                text: snapshot.content.clone(),
            });
        }

        content.extend(snapshot.tool_calls.iter().map(|call| AnthropicContentBlock::ToolUse {
            id: call.id_or_fallback(),
            name: call.name.clone(),
            input: arguments_to_value(&call.arguments),
        }));

        AnthropicResponse {
            id: snapshot.id.clone().unwrap_or_default(),
            response_type: message_type(),
            role: "assistant".to_owned(),
            content,
            model: snapshot.model.clone(),
            stop_reason: snapshot.finish_reason.clone(),
            stop_sequence: None,
            usage: snapshot.usage.map(|u| AnthropicUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

// -- Tool schema lowering --

/// `{"name", "description", "input_schema"}`
pub fn lower_tool(definition: &FunctionDefinition) -> Value {
    json!({
        "name": definition.name,
        "description": definition.description,
        "input_schema": definition.parameters,
    })
}

/// `tool_choice` value
pub fn lower_tool_choice(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::None => json!({"type": "none"}),
        ToolChoice::Auto => json!({"type": "auto"}),
        ToolChoice::Required => json!({"type": "any"}),
        ToolChoice::Tool(name) => json!({"type": "tool", "name": name}),
    }
}
