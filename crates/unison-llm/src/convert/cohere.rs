//! Cohere v2 chat adapter

use serde_json::{Value, json};

use super::{ResponseAdapter, fallback_call_id};
use crate::history::MessageHistory;
use crate::protocol::cohere::{
    CohereBilledUnits, CohereContent, CohereContentItem, CohereFunctionCall, CohereMessage, CohereResponse,
    CohereStreamEvent, CohereToolCall, CohereUsage,
};
use crate::stream::{ChunkAdapter, StreamSnapshot};
use crate::tools::ToolInstance;
use crate::types::{FunctionDefinition, StreamChunk, ToolCall, ToolCallFragment, ToolChoice, Usage, WireFormat};

impl ResponseAdapter for CohereResponse {
    const FORMAT: WireFormat = WireFormat::Cohere;

    fn content(&self) -> String {
        match &self.message.content {
            Some(CohereContent::Text(text)) => text.clone(),
            Some(CohereContent::Items(items)) => items
                .iter()
                .find_map(|item| match item {
                    CohereContentItem::Text { text } => Some(text.clone()),
                    CohereContentItem::Document { .. } => None,
                })
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn finish_reasons(&self) -> Vec<String> {
        vec![self.finish_reason.clone().unwrap_or_default()]
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.and_then(usage_from_wire)
    }

    /// Cohere does not echo the model
    fn model(&self) -> Option<&str> {
        None
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.message
            .tool_calls
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, call)| {
                let id = call.id.clone().unwrap_or_else(|| fallback_call_id(i));
                ToolCall::new(id, &call.function.name, &call.function.arguments)
            })
            .collect()
    }
}

/// Billed units when present, otherwise raw token counts
fn usage_from_wire(usage: CohereUsage) -> Option<Usage> {
    let (input, output) = match (usage.billed_units, usage.tokens) {
        (Some(billed), _) => (billed.input_tokens, billed.output_tokens),
        (None, Some(tokens)) => (tokens.input_tokens, tokens.output_tokens),
        (None, None) => return None,
    };
    Some(Usage::new(input.and_then(units), output.and_then(units), None))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn units(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}

impl MessageHistory for CohereResponse {
    type MessageParam = CohereMessage;

    fn message_param(&self) -> CohereMessage {
        CohereMessage {
            role: "assistant".to_owned(),
            ..self.message.clone()
        }
    }

    fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<CohereMessage> {
        results
            .iter()
            .map(|(tool, output)| CohereMessage {
                role: "tool".to_owned(),
                content: Some(CohereContent::Items(vec![CohereContentItem::Document {
                    document: json!({"data": output}),
                }])),
                tool_calls: None,
                tool_plan: None,
                tool_call_id: Some(tool.id().to_owned()),
            })
            .collect()
    }
}

/// Chunk adapter for Cohere v2 event streams
#[derive(Debug, Default)]
pub struct CohereChunkAdapter;

impl ChunkAdapter for CohereChunkAdapter {
    type Chunk = CohereStreamEvent;
    type Response = CohereResponse;

    fn normalize(&mut self, event: &CohereStreamEvent) -> StreamChunk {
        match event {
            CohereStreamEvent::MessageStart { id } => StreamChunk {
                id: id.clone(),
                ..StreamChunk::default()
            },

            CohereStreamEvent::ContentDelta { delta, .. } => StreamChunk::text(
                delta
                    .message
                    .content
                    .as_ref()
                    .map(|content| content.text.clone())
                    .unwrap_or_default(),
            ),

            CohereStreamEvent::ToolCallStart { index, delta } | CohereStreamEvent::ToolCallDelta { index, delta } => {
                let Some(call) = &delta.message.tool_calls else {
                    return StreamChunk::default();
                };
                let function = call.function.as_ref();

                StreamChunk {
                    tool_calls: vec![ToolCallFragment {
                        index: *index,
                        id: call.id.clone(),
                        name: function.and_then(|f| f.name.clone()),
                        arguments: function.and_then(|f| f.arguments.clone()),
                    }],
                    ..StreamChunk::default()
                }
            }

            CohereStreamEvent::MessageEnd { delta } => StreamChunk {
                finish_reason: delta.finish_reason.clone(),
                usage: delta.usage.and_then(usage_from_wire),
                ..StreamChunk::default()
            },

            CohereStreamEvent::ContentStart { .. }
            | CohereStreamEvent::ContentEnd { .. }
            | CohereStreamEvent::ToolPlanDelta { .. }
            | CohereStreamEvent::ToolCallEnd { .. }
            | CohereStreamEvent::CitationStart {}
            | CohereStreamEvent::CitationEnd {} => StreamChunk::default(),
        }
    }

    fn assemble(&self, snapshot: &StreamSnapshot) -> CohereResponse {
        let tool_calls: Vec<CohereToolCall> = snapshot
            .tool_calls
            .iter()
            .map(|call| CohereToolCall {
                id: Some(call.id_or_fallback()),
                tool_type: "function".to_owned(),
                function: CohereFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect();

        CohereResponse {
            id: snapshot.id.clone().unwrap_or_default(),
            finish_reason: snapshot.finish_reason.clone(),
            message: CohereMessage {
                role: "assistant".to_owned(),
                content: (!snapshot.content.is_empty()).then(|| CohereContent::Text(snapshot.content.clone())),
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                tool_plan: None,
                tool_call_id: None,
            },
            usage: snapshot.usage.map(|u| CohereUsage {
                billed_units: Some(CohereBilledUnits {
                    input_tokens: u.input_tokens.map(f64::from),
                    output_tokens: u.output_tokens.map(f64::from),
                }),
                tokens: None,
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
///
/// Cohere can only require or forbid tool use; `Auto` is the default and a
/// specific tool cannot be forced, so it lowers to `REQUIRED`.
pub fn lower_tool_choice(choice: &ToolChoice) -> Option<Value> {
    match choice {
        ToolChoice::Auto => None,
        ToolChoice::None => Some(json!("NONE")),
        ToolChoice::Required | ToolChoice::Tool(_) => Some(json!("REQUIRED")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ToolSchema;
    use crate::stream::StreamReassembler;
    use crate::tools::validate_call;
    use crate::types::{CallParams, Provider};

    fn response() -> CohereResponse {
        CohereResponse::decode_value(json!({
            "id": "c14c80c3-18eb-4519-9460-6c92edd8cfb4",
            "finish_reason": "TOOL_CALL",
            "message": {
                "role": "assistant",
                "tool_plan": "I will look up the weather.",
                "tool_calls": [{
                    "id": "get_weather_1byjy32y4hvq",
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": "{\"city\":\"Oslo\"}"}
                }]
            },
            "usage": {
                "billed_units": {"input_tokens": 37, "output_tokens": 16},
                "tokens": {"input_tokens": 1056, "output_tokens": 64}
            }
        }))
        .unwrap()
    }

    #[test]
    fn billed_units_are_the_usage() {
        let response = response();
        let usage = response.usage().unwrap();
        assert_eq!(usage.input_tokens, Some(37));
        assert_eq!(usage.output_tokens, Some(16));
        assert_eq!(response.model(), None);
        assert_eq!(response.content(), "");
        assert_eq!(response.finish_reasons(), ["TOOL_CALL"]);
    }

    #[test]
    fn tool_results_are_documents() {
        let response = response();
        let schema = ToolSchema::new("get_weather", "");
        let instance = validate_call(&response.tool_calls()[0], &schema).unwrap();

        let value = serde_json::to_value(response.tool_message_params(&[(instance, "cold".to_owned())])).unwrap();
        assert_eq!(
            value,
            json!([{
                "role": "tool",
                "tool_call_id": "get_weather_1byjy32y4hvq",
                "content": [{"type": "document", "document": {"data": "cold"}}]
            }])
        );
    }

    #[test]
    fn assistant_turn_keeps_tool_plan() {
        let value = serde_json::to_value(response().message_param()).unwrap();
        assert_eq!(value["tool_plan"], "I will look up the weather.");
        assert_eq!(value["tool_calls"][0]["function"]["name"], "get_weather");
    }

    #[test]
    fn stream_events_reassemble() {
        let events = [
            json!({"type": "message-start", "id": "msg-1", "delta": {"message": {"role": "assistant"}}}),
            json!({"type": "tool-plan-delta", "delta": {"message": {"tool_plan": "Checking"}}}),
            json!({"type": "tool-call-start", "index": 0, "delta": {"message": {"tool_calls": {"id": "gw_1", "type": "function", "function": {"name": "get_weather", "arguments": ""}}}}}),
            json!({"type": "tool-call-delta", "index": 0, "delta": {"message": {"tool_calls": {"function": {"arguments": "{\"city\":"}}}}}),
            json!({"type": "tool-call-delta", "index": 0, "delta": {"message": {"tool_calls": {"function": {"arguments": "\"Oslo\"}"}}}}}),
            json!({"type": "tool-call-end", "index": 0}),
            json!({"type": "message-end", "delta": {"finish_reason": "TOOL_CALL", "usage": {"billed_units": {"input_tokens": 37, "output_tokens": 16}}}}),
        ];

        let mut reassembler =
            StreamReassembler::<CohereChunkAdapter>::new(CallParams::new(Provider::Cohere, "command-r-plus"));
        for event in &events {
            reassembler.push_json(&event.to_string()).unwrap();
        }
        reassembler.finish();

        let response = reassembler.construct_call_response().unwrap();
        let calls = response.tool_calls().unwrap();
        assert_eq!(calls[0].id, "gw_1");
        assert_eq!(calls[0].arguments(), r#"{"city":"Oslo"}"#);
        assert_eq!(response.model(), "command-r-plus");
        assert_eq!(response.id(), Some("msg-1"));
        assert_eq!(response.input_tokens(), Some(37));
    }

    #[test]
    fn auto_choice_is_omitted() {
        assert_eq!(lower_tool_choice(&ToolChoice::Auto), None);
        assert_eq!(lower_tool_choice(&ToolChoice::Tool("f".to_owned())), Some(json!("REQUIRED")));
    }
}
