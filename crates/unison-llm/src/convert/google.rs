//! Google `generateContent` adapter (Gemini API and Vertex AI)

use serde_json::{Value, json};

use super::{ResponseAdapter, fallback_call_id};
use crate::history::MessageHistory;
use crate::protocol::google::{
    GoogleCandidate, GoogleContent, GoogleFunctionCall, GoogleFunctionResponse, GooglePart, GoogleResponse,
    GoogleStreamChunk, GoogleUsageMetadata,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::message::{arguments_to_text, arguments_to_value};
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl GoogleResponse {
    fn primary(&self) -> Option<&GoogleCandidate> {
        self.candidates.first()
    }

    fn function_calls(&self) -> impl Iterator<Item = &GoogleFunctionCall> {
        self.primary()
            .into_iter()
            .flat_map(|candidate| candidate.content.parts.iter())
            .filter_map(|part| match part {
                GooglePart::FunctionCall(call) => Some(call),
                GooglePart::Text(_) | GooglePart::InlineData(_) | GooglePart::FunctionResponse(_) => None,
            })
    }
}

impl ResponseAdapter for GoogleResponse {
    const FORMAT: WireFormat = WireFormat::Google;

    fn content(&self) -> String {
        self.primary()
            .and_then(|candidate| {
                candidate.content.parts.iter().find_map(|part| match part {
                    GooglePart::Text(text) => Some(text.clone()),
                    GooglePart::InlineData(_) | GooglePart::FunctionCall(_) | GooglePart::FunctionResponse(_) => None,
                })
            })
            .unwrap_or_default()
    }

    fn finish_reasons(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| candidate.finish_reason.clone().unwrap_or_default())
            .collect()
    }

    fn usage(&self) -> Option<Usage> {
        self.usage_metadata.map(usage_from_wire)
    }

    fn model(&self) -> Option<&str> {
        self.model_version.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    /// Calls without an id are numbered `call_{n}` by position among the
    /// function calls
    fn tool_calls(&self) -> Vec<ToolCall> {
        self.function_calls()
            .enumerate()
            .map(|(i, call)| {
                let id = call.id.clone().unwrap_or_else(|| fallback_call_id(i));
                ToolCall::new(id, &call.name, arguments_to_text(&call.args))
            })
            .collect()
    }
}

fn usage_from_wire(usage: GoogleUsageMetadata) -> Usage {
    Usage::new(
        usage.prompt_token_count,
        usage.candidates_token_count,
        usage.total_token_count,
    )
}

impl MessageHistory for GoogleResponse {
    type MessageParam = GoogleContent;

    fn message_param(&self) -> GoogleContent {
        let parts = self
            .primary()
            .map(|candidate| candidate.content.parts.clone())
            .unwrap_or_default();

        GoogleContent {
            role: Some("model".to_owned()),
            parts,
        }
    }

    /// A single user turn with one `functionResponse` part per result
    ///
    /// The call id is echoed only when the provider assigned one.
    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<GoogleContent> {
        if results.is_empty() {
            return Vec::new();
        }

        let parts = results
            .iter()
            .map(|(tool, output)| {
                let id = self
                    .function_calls()
                    .any(|call| call.id.as_deref() == Some(tool.id()))
                    .then(|| tool.id().to_owned());

                GooglePart::FunctionResponse(GoogleFunctionResponse {
                    id,
                    name: tool.name().to_owned(),
                    response: json!({"result": output}),
                })
            })
            .collect();

        vec![GoogleContent {
            role: Some("user".to_owned()),
            parts,
        }]
    }
}

/// Chunk adapter for Google streams
///
/// Each chunk is a complete `generateContent` response holding only the new
/// parts. Function calls arrive whole and are numbered sequentially.
#[derive(Debug, Default)]
pub struct GoogleChunkAdapter {
    next_call_index: u32,
}

impl ChunkAdapter for GoogleChunkAdapter {
    type Chunk = GoogleStreamChunk;
    type Response = GoogleResponse;

    fn normalize(&mut self, chunk: &GoogleStreamChunk) -> StreamChunk {
        let mut normalized = StreamChunk {
            usage: chunk.usage_metadata.map(usage_from_wire),
            id: chunk.response_id.clone(),
            model: chunk.model_version.clone(),
            ..StreamChunk::default()
        };

        let Some(candidate) = chunk.candidates.first() else {
            return normalized;
        };

        normalized.finish_reason.clone_from(&candidate.finish_reason);

        for part in &candidate.content.parts {
            match part {
                GooglePart::Text(text) => normalized.content.push_str(text),
                GooglePart::FunctionCall(call) => {
                    normalized.tool_calls.push(ToolCallFragment {
                        index: self.next_call_index,
                        id: call.id.clone(),
                        name: Some(call.name.clone()),
                        arguments: Some(arguments_to_text(&call.args)),
                    });
                    self.next_call_index += 1;
                }
                GooglePart::InlineData(_) | GooglePart::FunctionResponse(_) => {}
            }
        }

        normalized
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> GoogleResponse {
        let mut parts = Vec::with_capacity(snapshot.tool_calls.len() + 1);

        if !snapshot.content.is_empty() {
            parts.push(GooglePart::Text(snapshot.content.clone()));
        }

        parts.extend(snapshot.tool_calls.iter().map(|call| {
            GooglePart::FunctionCall(GoogleFunctionCall {
                id: call.id.clone(),
                name: call.name.clone(),
                args: arguments_to_value(&call.arguments),
            })
        }));

        GoogleResponse {
            candidates: vec![GoogleCandidate {
                content: GoogleContent {
                    role: Some("model".to_owned()),
                    parts,
                },
                finish_reason: snapshot.finish_reason.clone(),
                index: Some(0),
            }],
            usage_metadata: snapshot.usage.map(|u| GoogleUsageMetadata {
                prompt_token_count: u.input_tokens,
                candidates_token_count: u.output_tokens,
                total_token_count: u.total_tokens,
            }),
            model_version: Some(snapshot.model.clone()),
            response_id: snapshot.id.clone(),
        }
    }
}

// -- Tool schema lowering --

/// One `tools` entry holding every declaration
pub fn lower_tools(definitions: &[FunctionDefinition]) -> Value {
    let declarations: Vec<Value> = definitions
        .iter()
        .map(|definition| {
            json!({
                "name": definition.name,
                "description": definition.description,
                "parameters": definition.parameters,
            })
        })
        .collect();

    json!({"function_declarations": declarations})
}

/// `tool_config` value
pub fn lower_tool_choice(choice: &ToolChoice) -> Value {
    let config = match choice {
        ToolChoice::None => json!({"mode": "NONE"}),
        ToolChoice::Auto => json!({"mode": "AUTO"}),
        ToolChoice::Required => json!({"mode": "ANY"}),
        ToolChoice::Tool(name) => json!({"mode": "ANY", "allowed_function_names": [name]}),
    };
    json!({"function_calling_config": config})
}
