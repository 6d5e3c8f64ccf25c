//! Recorded provider payloads for one weather-lookup turn
//!
//! Every format carries the same turn: the text "Checking the weather.", one
//! `get_weather` call with id `call_w1` and arguments `{"city":"Oslo"}`, and
//! 12 input / 116 output tokens.

use serde_json::{Value, json};
use unison_llm::{CallParams, CallResponse, Field, FieldType, MessageHistory, Provider, ToolSchema};

pub const TEXT: &str = "Checking the weather.";
pub const CALL_ID: &str = "call_w1";
pub const ARGUMENTS: &str = r#"{"city":"Oslo"}"#;

/// Every wire format with a provider and model that speaks it
pub const CASES: [(Provider, &str); 6] = [
    (Provider::OpenAi, "gpt-4o"),
    (Provider::Anthropic, "claude-3-5-sonnet-20240620"),
    (Provider::Gemini, "gemini-1.5-pro"),
    (Provider::Mistral, "mistral-large-latest"),
    (Provider::Cohere, "command-r-plus"),
    (Provider::Bedrock, "anthropic.claude-3-5-sonnet-20240620-v1:0"),
];

pub fn get_weather() -> ToolSchema {
    ToolSchema::new("get_weather", "Current weather for a city")
        .with_field(Field::new("city", FieldType::String).describe("City name"))
}

/// Decode `raw` and wrap it for a call that declared `tools`
pub fn normalize<R: MessageHistory>(provider: Provider, model: &str, raw: Value, tools: &[ToolSchema]) -> CallResponse<R> {
    let params = CallParams::new(provider, model).with_tools(tools.iter().cloned());
    CallResponse::new(R::decode_value(raw).expect("fixture decodes"), params)
}

pub fn openai_response() -> Value {
    json!({
        "id": "chatcmpl-9x",
        "object": "chat.completion",
        "created": 1_718_000_000,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": TEXT,
                "tool_calls": [{
                    "id": CALL_ID,
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": ARGUMENTS}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 116, "total_tokens": 128}
    })
}

pub fn anthropic_response() -> Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20240620",
        "content": [
            {"type": "text", "text": TEXT},
            {"type": "tool_use", "id": CALL_ID, "name": "get_weather", "input": {"city": "Oslo"}}
        ],
        "stop_reason": "tool_use",
        "stop_sequence": null,
        "usage": {"input_tokens": 12, "output_tokens": 116}
    })
}

pub fn google_response() -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": TEXT},
                {"functionCall": {"id": CALL_ID, "name": "get_weather", "args": {"city": "Oslo"}}}
            ]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 116, "totalTokenCount": 128},
        "modelVersion": "gemini-1.5-pro",
        "responseId": "resp-7"
    })
}

pub fn mistral_response() -> Value {
    json!({
        "id": "cmpl-e5cc70bb",
        "object": "chat.completion",
        "model": "mistral-large-latest",
        "created": 1_718_000_000,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": TEXT,
                "tool_calls": [{"id": CALL_ID, "function": {"name": "get_weather", "arguments": ARGUMENTS}}]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 116, "total_tokens": 128}
    })
}

pub fn cohere_response() -> Value {
    json!({
        "id": "5a50480a-cf52-46f0-af01-53d18539bd31",
        "finish_reason": "TOOL_CALL",
        "message": {
            "role": "assistant",
            "content": [{"type": "text", "text": TEXT}],
            "tool_calls": [{
                "id": CALL_ID,
                "type": "function",
                "function": {"name": "get_weather", "arguments": ARGUMENTS}
            }]
        },
        "usage": {"billed_units": {"input_tokens": 12, "output_tokens": 116}}
    })
}

pub fn bedrock_response() -> Value {
    json!({
        "output": {"message": {"role": "assistant", "content": [
            {"text": TEXT},
            {"toolUse": {"toolUseId": CALL_ID, "name": "get_weather", "input": {"city": "Oslo"}}}
        ]}},
        "stopReason": "tool_use",
        "usage": {"inputTokens": 12, "outputTokens": 116, "totalTokens": 128},
        "metrics": {"latencyMs": 812}
    })
}

// -- Streams --

pub fn openai_stream() -> Vec<Value> {
    let chunk = |choice: Value| json!({"id": "chatcmpl-9x", "model": "gpt-4o", "choices": [choice]});
    vec![
        chunk(json!({"index": 0, "delta": {"role": "assistant", "content": "Checking "}})),
        chunk(json!({"index": 0, "delta": {"content": "the weather."}})),
        chunk(json!({"index": 0, "delta": {"tool_calls": [
            {"index": 0, "id": CALL_ID, "type": "function", "function": {"name": "get_weather", "arguments": ""}}
        ]}})),
        chunk(json!({"index": 0, "delta": {"tool_calls": [{"index": 0, "function": {"arguments": "{\"city\":"}}]}})),
        chunk(json!({"index": 0, "delta": {"tool_calls": [{"index": 0, "function": {"arguments": "\"Oslo\"}"}}]}})),
        chunk(json!({"index": 0, "delta": {}, "finish_reason": "tool_calls"})),
        json!({"id": "chatcmpl-9x", "model": "gpt-4o", "choices": [],
               "usage": {"prompt_tokens": 12, "completion_tokens": 116, "total_tokens": 128}}),
    ]
}

pub fn anthropic_stream() -> Vec<Value> {
    vec![
        json!({"type": "message_start", "message": {
            "id": "msg_01", "type": "message", "role": "assistant", "content": [],
            "model": "claude-3-5-sonnet-20240620", "usage": {"input_tokens": 12, "output_tokens": 1}
        }}),
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        json!({"type": "ping"}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Checking "}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "the weather."}}),
        json!({"type": "content_block_stop", "index": 0}),
        json!({"type": "content_block_start", "index": 1,
               "content_block": {"type": "tool_use", "id": CALL_ID, "name": "get_weather", "input": {}}}),
        json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "{\"city\":"}}),
        json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "\"Oslo\"}"}}),
        json!({"type": "content_block_stop", "index": 1}),
        json!({"type": "message_delta", "delta": {"stop_reason": "tool_use", "stop_sequence": null}, "usage": {"output_tokens": 116}}),
        json!({"type": "message_stop"}),
    ]
}

pub fn google_stream() -> Vec<Value> {
    vec![
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "Checking "}]}}], "modelVersion": "gemini-1.5-pro"}),
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "the weather."}]}}], "modelVersion": "gemini-1.5-pro"}),
        json!({"candidates": [{"content": {"role": "model", "parts": [
                   {"functionCall": {"id": CALL_ID, "name": "get_weather", "args": {"city": "Oslo"}}}
               ]}, "finishReason": "STOP"}],
               "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 116, "totalTokenCount": 128},
               "modelVersion": "gemini-1.5-pro"}),
    ]
}

pub fn mistral_stream() -> Vec<Value> {
    let chunk = |choice: Value| json!({"id": "cmpl-e5cc70bb", "model": "mistral-large-latest", "choices": [choice]});
    vec![
        chunk(json!({"index": 0, "delta": {"role": "assistant", "content": "Checking "}})),
        chunk(json!({"index": 0, "delta": {"content": "the weather."}})),
        chunk(json!({"index": 0, "delta": {"tool_calls": [
            {"id": CALL_ID, "function": {"name": "get_weather", "arguments": ARGUMENTS}}
        ]}, "finish_reason": "tool_calls"})),
        json!({"id": "cmpl-e5cc70bb", "model": "mistral-large-latest", "choices": [],
               "usage": {"prompt_tokens": 12, "completion_tokens": 116, "total_tokens": 128}}),
    ]
}

pub fn cohere_stream() -> Vec<Value> {
    vec![
        json!({"type": "message-start", "id": "5a50480a", "delta": {"message": {"role": "assistant"}}}),
        json!({"type": "content-start", "index": 0, "delta": {"message": {"content": {"type": "text", "text": ""}}}}),
        json!({"type": "content-delta", "index": 0, "delta": {"message": {"content": {"text": "Checking "}}}}),
        json!({"type": "content-delta", "index": 0, "delta": {"message": {"content": {"text": "the weather."}}}}),
        json!({"type": "content-end", "index": 0}),
        json!({"type": "tool-call-start", "index": 0, "delta": {"message": {"tool_calls": {
            "id": CALL_ID, "type": "function", "function": {"name": "get_weather", "arguments": ""}
        }}}}),
        json!({"type": "tool-call-delta", "index": 0, "delta": {"message": {"tool_calls": {"function": {"arguments": "{\"city\":"}}}}}),
        json!({"type": "tool-call-delta", "index": 0, "delta": {"message": {"tool_calls": {"function": {"arguments": "\"Oslo\"}"}}}}}),
        json!({"type": "tool-call-end", "index": 0}),
        json!({"type": "message-end", "delta": {"finish_reason": "TOOL_CALL",
               "usage": {"billed_units": {"input_tokens": 12, "output_tokens": 116}}}}),
    ]
}

pub fn bedrock_stream() -> Vec<Value> {
    vec![
        json!({"messageStart": {"role": "assistant"}}),
        json!({"contentBlockDelta": {"contentBlockIndex": 0, "delta": {"text": "Checking "}}}),
        json!({"contentBlockDelta": {"contentBlockIndex": 0, "delta": {"text": "the weather."}}}),
        json!({"contentBlockStop": {"contentBlockIndex": 0}}),
        json!({"contentBlockStart": {"contentBlockIndex": 1, "start": {"toolUse": {"toolUseId": CALL_ID, "name": "get_weather"}}}}),
        json!({"contentBlockDelta": {"contentBlockIndex": 1, "delta": {"toolUse": {"input": "{\"city\":"}}}}),
        json!({"contentBlockDelta": {"contentBlockIndex": 1, "delta": {"toolUse": {"input": "\"Oslo\"}"}}}}),
        json!({"contentBlockStop": {"contentBlockIndex": 1}}),
        json!({"messageStop": {"stopReason": "tool_use"}}),
        json!({"metadata": {"usage": {"inputTokens": 12, "outputTokens": 116, "totalTokens": 128}, "metrics": {"latencyMs": 812}}}),
    ]
}
