//! `OpenAI` chat completions adapter (also Groq and Azure `OpenAI`)

use serde_json::{Value, json};

use super::{ResponseAdapter, non_empty};
use crate::history::MessageHistory;
use crate::protocol::openai::{
    OpenAiChoice, OpenAiContent, OpenAiContentPart, OpenAiFunctionCall, OpenAiMessage, OpenAiResponse,
    OpenAiStreamChunk, OpenAiToolCall, OpenAiUsage, function_type,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl ResponseAdapter for OpenAiResponse {
    const FORMAT: WireFormat = WireFormat::OpenAi;

    fn content(&self) -> String {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .map(content_text)
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
                    .map(|tc| ToolCall::new(&tc.id, &tc.function.name, &tc.function.arguments))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// First text part of list content, or the whole string
fn content_text(content: &OpenAiContent) -> String {
    match content {
        OpenAiContent::Text(text) => text.clone(),
        OpenAiContent::Parts(parts) => parts
            .iter()
            .find_map(|part| match part {
                OpenAiContentPart::Text { text } => Some(text.clone()),
                OpenAiContentPart::Refusal { .. } | OpenAiContentPart::ImageUrl { .. } => None,
            })
            .unwrap_or_default(),
    }
}

fn usage_from_wire(usage: OpenAiUsage) -> Usage {
    Usage::new(usage.prompt_tokens, usage.completion_tokens, usage.total_tokens)
}

fn usage_to_wire(usage: Usage) -> OpenAiUsage {
    OpenAiUsage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
        total_tokens: usage.total_tokens,
    }
}

impl MessageHistory for OpenAiResponse {
    type MessageParam = OpenAiMessage;

    fn message_param(&self) -> OpenAiMessage {
        self.choices.first().map_or_else(
            || OpenAiMessage {
                role: "assistant".to_owned(),
                content: Some(OpenAiContent::Text(String::new())),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            |choice| choice.message.clone(),
        )
    }

    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<OpenAiMessage> {
        results
            .iter()
            .map(|(tool, output)| OpenAiMessage {
                role: "tool".to_owned(),
                content: Some(OpenAiContent::Text(output.clone())),
                name: Some(tool.name().to_owned()),
                tool_calls: None,
                tool_call_id: Some(tool.id().to_owned()),
            })
            .collect()
    }
}

/// Chunk adapter for `OpenAI` streams
///
/// Only choice 0 contributes content and tool calls.
#[derive(Debug, Default)]
pub struct OpenAiChunkAdapter;

impl ChunkAdapter for OpenAiChunkAdapter {
    type Chunk = OpenAiStreamChunk;
    type Response = OpenAiResponse;

    fn normalize(&mut self, chunk: &OpenAiStreamChunk) -> StreamChunk {
        let mut normalized = StreamChunk {
            usage: chunk.usage.map(usage_from_wire),
            id: non_empty(&chunk.id).map(str::to_owned),
            model: non_empty(&chunk.model).map(str::to_owned),
            ..StreamChunk::default()
        };

        let Some(choice) = chunk.choices.iter().find(|choice| choice.index == 0) else {
            return normalized;
        };

        normalized.content = choice.delta.content.clone().unwrap_or_default();
        normalized.finish_reason.clone_from(&choice.finish_reason);

        if let Some(calls) = &choice.delta.tool_calls {
            normalized.tool_calls = calls
                .iter()
                .map(|tc| ToolCallFragment {
                    index: tc.index,
                    id: tc.id.clone(),
                    name: tc.function.as_ref().and_then(|f| f.name.clone()),
                    arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
                })
                .collect();
        }

        normalized
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> OpenAiResponse {
        let tool_calls: Vec<OpenAiToolCall> = snapshot
            .tool_calls
            .iter()
            .map(|call| OpenAiToolCall {
                id: call.id_or_fallback(),
                tool_type: function_type(),
                function: OpenAiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect();

        let content = if snapshot.content.is_empty() && !tool_calls.is_empty() {
            None
        } else {
            Some(OpenAiContent::Text(snapshot.content.clone()))
        };

        OpenAiResponse {
            id: snapshot.id.clone().unwrap_or_default(),
            object: "chat.completion".to_owned(),
            created: 0,
            model: snapshot.model.clone(),
            choices: vec![OpenAiChoice {
                index: 0,
                message: OpenAiMessage {
                    role: "assistant".to_owned(),
                    content,
                    name: None,
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                    tool_call_id: None,
                },
                finish_reason: snapshot.finish_reason.clone(),
            }],
            usage: snapshot.usage.map(usage_to_wire),
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
        ToolChoice::Required => json!("required"),
        ToolChoice::Tool(name) => json!({"type": "function", "function": {"name": name}}),
    }
}
