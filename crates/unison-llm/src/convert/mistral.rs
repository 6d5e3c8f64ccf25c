//! Mistral chat adapter

use serde_json::{Value, json};

use super::{ResponseAdapter, fallback_call_id, non_empty};
use crate::history::MessageHistory;
use crate::protocol::mistral::{
    MistralChoice, MistralContent, MistralContentChunk, MistralFunctionCall, MistralMessage, MistralResponse,
    MistralStreamChunk, MistralToolCall, MistralUsage,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::message::arguments_to_text;
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl ResponseAdapter for MistralResponse {
    const FORMAT: WireFormat = WireFormat::Mistral;

    fn content(&self) -> String {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .map(first_text)
            .unwrap_or_default()
    }

    fn finish_reasons(&self) -> Vec<String> {
        self.choices
            .iter()
            .map(|choice| choice.finish_reason.clone().unwrap_or_default())
            .collect()
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.map(usage_from_wire)
    }

    fn model(&self) -> Option<&str> {
        non_empty(&self.model)
    }

    fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_ref())
            .map(|calls| {
                calls
                    .iter()
                    .enumerate()
                    .map(|(i, call)| {
                        let id = call.id.clone().unwrap_or_else(|| fallback_call_id(i));
                        ToolCall::new(id, &call.function.name, arguments_to_text(&call.function.arguments))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn first_text(content: &MistralContent) -> String {
    match content {
        MistralContent::Text(text) => text.clone(),
        MistralContent::Chunks(chunks) => chunks.iter().find_map(chunk_text).unwrap_or_default(),
    }
}

fn chunk_text(chunk: &MistralContentChunk) -> Option<String> {
    match chunk {
        MistralContentChunk::Text { text } => Some(text.clone()),
        MistralContentChunk::ImageUrl { .. } | MistralContentChunk::Reference { .. } => None,
    }
}

fn usage_from_wire(usage: MistralUsage) -> Usage {
    Usage::new(usage.prompt_tokens, usage.completion_tokens, usage.total_tokens)
}

impl MessageHistory for MistralResponse {
    type MessageParam = MistralMessage;

    fn message_param(&self) -> MistralMessage {
        self.choices.first().map_or_else(
            || MistralMessage {
                role: "assistant".to_owned(),
                content: Some(MistralContent::Text(String::new())),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            |choice| choice.message.clone(),
        )
    }

    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<MistralMessage> {
        results
            .iter()
            .map(|(tool, output)| MistralMessage {
                role: "tool".to_owned(),
                content: Some(MistralContent::Text(output.clone())),
                name: Some(tool.name().to_owned()),
                tool_calls: None,
                tool_call_id: Some(tool.id().to_owned()),
            })
            .collect()
    }
}

/// Chunk adapter for Mistral streams
///
/// Mistral sends each tool call whole in a single delta. Calls without an
/// explicit `index` are numbered in arrival order.
#[derive(Debug, Default)]
pub struct MistralChunkAdapter {
    next_call_index: u32,
}

impl ChunkAdapter for MistralChunkAdapter {
    type Chunk = MistralStreamChunk;
    type Response = MistralResponse;

    fn normalize(&mut self, chunk: &MistralStreamChunk) -> StreamChunk {
        let mut normalized = StreamChunk {
            usage: chunk.usage.map(usage_from_wire),
            id: non_empty(&chunk.id).map(str::to_owned),
            model: non_empty(&chunk.model).map(str::to_owned),
            ..StreamChunk::default()
        };

        let Some(choice) = chunk.choices.iter().find(|choice| choice.index == 0) else {
            return normalized;
        };

        normalized.finish_reason.clone_from(&choice.finish_reason);
        normalized.content = match &choice.delta.content {
            Some(MistralContent::Text(text)) => text.clone(),
            Some(MistralContent::Chunks(chunks)) => chunks.iter().filter_map(chunk_text).collect(),
            None => String::new(),
        };

        for call in choice.delta.tool_calls.iter().flatten() {
            let index = call.index.unwrap_or(self.next_call_index);
            self.next_call_index = self.next_call_index.max(index.saturating_add(1));

            normalized.tool_calls.push(ToolCallFragment {
                index,
                id: call.id.clone(),
                name: Some(call.function.name.clone()),
                arguments: Some(arguments_to_text(&call.function.arguments)),
            });
        }

        normalized
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> MistralResponse {
        let tool_calls: Vec<MistralToolCall> = snapshot
            .tool_calls
            .iter()
            .map(|call| MistralToolCall {
                id: Some(call.id_or_fallback()),
                tool_type: Some("function".to_owned()),
                function: MistralFunctionCall {
                    name: call.name.clone(),
                    arguments: Value::String(call.arguments.clone()),
                },
                index: None,
            })
            .collect();

        MistralResponse {
            id: snapshot.id.clone().unwrap_or_default(),
            object: "chat.completion".to_owned(),
            model: snapshot.model.clone(),
            created: 0,
            choices: vec![MistralChoice {
                index: 0,
                message: MistralMessage {
                    role: "assistant".to_owned(),
                    content: Some(MistralContent::Text(snapshot.content.clone())),
                    name: None,
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                    tool_call_id: None,
                },
                finish_reason: snapshot.finish_reason.clone(),
            }],
            usage: snapshot.usage.map(|u| MistralUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.total_tokens,
            }),
        }
    }
}

// -- Tool schema lowering --

/// `{"type": "function", "function": {...}}`
pub fn lower_tool(definition: &FunctionDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": definition.name,
            "description": definition.description,
            "parameters": definition.parameters,
        }
    })
}

/// `tool_choice` value
pub fn lower_tool_choice(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::None => json!("none"),
        ToolChoice::Auto => json!("auto"),
        ToolChoice::Required => json!("any"),
        ToolChoice::Tool(name) => json!({"type": "function", "function": {"name": name}}),
    }
}
