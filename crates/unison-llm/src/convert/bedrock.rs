//! AWS Bedrock Converse adapter

use std::collections::HashMap;

use serde_json::{Value, json};

use super::ResponseAdapter;
use crate::history::MessageHistory;
use crate::protocol::bedrock::{
    BedrockBlockDelta, BedrockBlockStart, BedrockContentBlock, BedrockMessage, BedrockOutput, BedrockResponse,
    BedrockStreamEvent, BedrockToolResult, BedrockToolResultContent, BedrockToolUse, BedrockUsage,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::message::{arguments_to_text, arguments_to_value};
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl ResponseAdapter for BedrockResponse {
    const FORMAT: WireFormat = WireFormat::Bedrock;

    fn content(&self) -> String {
        self.output
            .message
            .content
            .iter()
            .find_map(|block| match block {
                BedrockContentBlock::Text(text) => Some(text.clone()),
                BedrockContentBlock::ToolUse(_) | BedrockContentBlock::ToolResult(_) => None,
            })
            .unwrap_or_default()
    }

    fn finish_reasons(&self) -> Vec<String> {
        vec![self.stop_reason.clone().unwrap_or_default()]
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.map(usage_from_wire)
    }

    /// Converse responses carry neither model nor id
    fn model(&self) -> Option<&str> {
        None
    }

    fn id(&self) -> Option<&str> {
        None
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.output
            .message
            .content
            .iter()
            .filter_map(|block| match block {
                BedrockContentBlock::ToolUse(tool_use) => Some(ToolCall::new(
                    &tool_use.tool_use_id,
                    &tool_use.name,
                    arguments_to_text(&tool_use.input),
                )),
                BedrockContentBlock::Text(_) | BedrockContentBlock::ToolResult(_) => None,
            })
            .collect()
    }
}

fn usage_from_wire(usage: BedrockUsage) -> Usage {
    Usage::new(usage.input_tokens, usage.output_tokens, usage.total_tokens)
}

impl MessageHistory for BedrockResponse {
    type MessageParam = BedrockMessage;

    fn message_param(&self) -> BedrockMessage {
        self.output.message.clone()
    }

    /// A single user message with one `toolResult` block per result
    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<BedrockMessage> {
        if results.is_empty() {
            return Vec::new();
        }

        let content = results
            .iter()
            .map(|(tool, output)| {
                BedrockContentBlock::ToolResult(BedrockToolResult {
                    tool_use_id: tool.id().to_owned(),
                    content: vec![BedrockToolResultContent::Text(output.clone())],
                    status: None,
                })
            })
            .collect();

        vec![BedrockMessage {
            role: "user".to_owned(),
            content,
        }]
    }
}

/// Chunk adapter for `ConverseStream` events
///
/// Text and tool-use blocks share `contentBlockIndex`, so tool calls are
/// renumbered sequentially as their blocks start.
#[derive(Debug, Default)]
pub struct BedrockChunkAdapter {
    /// Content block index to tool-call index
    tool_blocks: HashMap<u32, u32>,
    next_tool_call_index: u32,
}

impl ChunkAdapter for BedrockChunkAdapter {
    type Chunk = BedrockStreamEvent;
    type Response = BedrockResponse;

    fn normalize(&mut self, event: &BedrockStreamEvent) -> StreamChunk {
        match event {
            BedrockStreamEvent::ContentBlockStart(start) => {
                let BedrockBlockStart::ToolUse(tool_use) = &start.start;
                let tool_index = self.next_tool_call_index;
                self.next_tool_call_index += 1;
                self.tool_blocks.insert(start.content_block_index, tool_index);

                StreamChunk {
                    tool_calls: vec![ToolCallFragment {
                        index: tool_index,
                        id: Some(tool_use.tool_use_id.clone()),
                        name: Some(tool_use.name.clone()),
                        arguments: None,
                    }],
                    ..StreamChunk::default()
                }
            }

            BedrockStreamEvent::ContentBlockDelta(delta) => match &delta.delta {
                BedrockBlockDelta::Text(text) => StreamChunk::text(text.clone()),
                BedrockBlockDelta::ToolUse(tool_use) => {
                    let Some(&tool_index) = self.tool_blocks.get(&delta.content_block_index) else {
                        tracing::debug!(
                            block = delta.content_block_index,
                            "tool input delta for a block that never started"
                        );
                        return StreamChunk::default();
                    };

                    StreamChunk {
                        tool_calls: vec![ToolCallFragment {
                            index: tool_index,
                            id: None,
                            name: None,
                            arguments: Some(tool_use.input.clone()),
                        }],
                        ..StreamChunk::default()
                    }
                }
            },

            BedrockStreamEvent::MessageStop(stop) => StreamChunk {
                finish_reason: Some(stop.stop_reason.clone()),
                ..StreamChunk::default()
            },

            BedrockStreamEvent::Metadata(metadata) => StreamChunk {
                usage: metadata.usage.map(usage_from_wire),
                ..StreamChunk::default()
            },

            BedrockStreamEvent::MessageStart(_) | BedrockStreamEvent::ContentBlockStop(_) => StreamChunk::default(),
        }
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> BedrockResponse {
        let mut content = Vec::with_capacity(snapshot.tool_calls.len() + 1);

        if !snapshot.content.is_empty() {
            content.push(BedrockContentBlock::Text(snapshot.content.clone()));
        }

        content.extend(snapshot.tool_calls.iter().map(|call| {
            BedrockContentBlock::ToolUse(BedrockToolUse {
                tool_use_id: call.id_or_fallback(),
                name: call.name.clone(),
                input: arguments_to_value(&call.arguments),
            })
        }));

        BedrockResponse {
            output: BedrockOutput {
                message: BedrockMessage {
                    role: "assistant".to_owned(),
                    content,
                },
            },
            stop_reason: snapshot.finish_reason.clone(),
            usage: snapshot.usage.map(|u| BedrockUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
                total_tokens: u.total_tokens,
            }),
            metrics: None,
        }
    }
}

// -- Tool schema lowering --

/// `{"toolSpec": {"name", "description", "inputSchema": {"json": ...}}}`
pub fn lower_tool(definition: &FunctionDefinition) -> Value {
    json!({
        "toolSpec": {
            "name": definition.name,
            "description": definition.description,
            "inputSchema": {"json": definition.parameters},
        }
    })
}

/// `toolChoice` value
///
/// Converse has no way to forbid tools once declared, so `None` is omitted.
pub fn lower_tool_choice(choice: &ToolChoice) -> Option<Value> {
    match choice {
        ToolChoice::None => None,
        ToolChoice::Auto => Some(json!({"auto": {}})),
        ToolChoice::Required => Some(json!({"any": {}})),
        ToolChoice::Tool(name) => Some(json!({"tool": {"name": name}})),
    }
}
