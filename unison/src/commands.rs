use std::path::Path;

use anyhow::Context;
use futures_util::{StreamExt, stream};
use unison_llm::convert::anthropic::AnthropicChunkAdapter;
use unison_llm::convert::bedrock::BedrockChunkAdapter;
use unison_llm::convert::cohere::CohereChunkAdapter;
use unison_llm::convert::google::GoogleChunkAdapter;
use unison_llm::convert::mistral::MistralChunkAdapter;
use unison_llm::convert::openai::OpenAiChunkAdapter;
use unison_llm::protocol::anthropic::AnthropicResponse;
use unison_llm::protocol::bedrock::BedrockResponse;
use unison_llm::protocol::cohere::CohereResponse;
use unison_llm::protocol::google::GoogleResponse;
use unison_llm::protocol::mistral::MistralResponse;
use unison_llm::protocol::openai::OpenAiResponse;
use unison_llm::{
    CallParams, CallResponse, CallStream, ChunkAdapter, MessageHistory, NormalizeOptions, ToolSchema, WireFormat,
};

use crate::args::CallArgs;

/// Print the normalized summary of a complete response
pub fn normalize(call: &CallArgs, options: NormalizeOptions) -> anyhow::Result<()> {
    let params = call_params(call)?;
    let raw = read(&call.input)?;

    match params.provider.wire_format() {
        WireFormat::OpenAi => print_response::<OpenAiResponse>(&raw, params, options),
        WireFormat::Anthropic => print_response::<AnthropicResponse>(&raw, params, options),
        WireFormat::Google => print_response::<GoogleResponse>(&raw, params, options),
        WireFormat::Mistral => print_response::<MistralResponse>(&raw, params, options),
        WireFormat::Cohere => print_response::<CohereResponse>(&raw, params, options),
        WireFormat::Bedrock => print_response::<BedrockResponse>(&raw, params, options),
    }
}

/// Replay a recorded stream, printing each normalized chunk and the final summary
pub async fn reassemble(call: &CallArgs, options: NormalizeOptions) -> anyhow::Result<()> {
    let params = call_params(call)?;
    let raw = read(&call.input)?;

    match params.provider.wire_format() {
        WireFormat::OpenAi => replay::<OpenAiChunkAdapter>(&raw, params, options).await,
        WireFormat::Anthropic => replay::<AnthropicChunkAdapter>(&raw, params, options).await,
        WireFormat::Google => replay::<GoogleChunkAdapter>(&raw, params, options).await,
        WireFormat::Mistral => replay::<MistralChunkAdapter>(&raw, params, options).await,
        WireFormat::Cohere => replay::<CohereChunkAdapter>(&raw, params, options).await,
        WireFormat::Bedrock => replay::<BedrockChunkAdapter>(&raw, params, options).await,
    }
}

fn call_params(call: &CallArgs) -> anyhow::Result<CallParams> {
    let mut params = CallParams::new(call.provider, &call.model);

    if let Some(path) = &call.tools {
        let tools: Vec<ToolSchema> = serde_json::from_str(&read(path)?)
            .with_context(|| format!("failed to parse tool schemas in {}", path.display()))?;
        params = params.with_tools(tools);
    }

    Ok(params)
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_response<R: MessageHistory>(raw: &str, params: CallParams, options: NormalizeOptions) -> anyhow::Result<()> {
    let response = CallResponse::with_options(R::decode(raw)?, params, options);
    print_summary(&response)
}

async fn replay<A>(raw: &str, params: CallParams, options: NormalizeOptions) -> anyhow::Result<()>
where
    A: ChunkAdapter + Unpin,
{
    let chunks = stream_lines(raw).map(serde_json::from_str::<A::Chunk>);
    let mut stream = CallStream::<_, A>::with_options(stream::iter(chunks), params, options);

    while let Some(chunk) = stream.next().await {
        println!("{}", serde_json::to_string(&chunk?)?);
    }

    print_summary(&stream.construct_call_response()?)
}

/// Payload lines of a recorded stream
///
/// Accepts bare JSON lines as well as server-sent event `data:` lines; the
/// `[DONE]` sentinel and other event fields are skipped.
fn stream_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(str::trim)
        .filter_map(|line| {
            if line.starts_with('{') {
                Some(line)
            } else {
                line.strip_prefix("data:").map(str::trim)
            }
        })
        .filter(|line| !line.is_empty() && *line != "[DONE]")
}

fn print_summary<R: MessageHistory>(response: &CallResponse<R>) -> anyhow::Result<()> {
    let summary = response.summary();

    tracing::info!(
        provider = %summary.provider,
        model = %summary.model,
        tool_calls = summary.tool_calls.len(),
        cost = ?summary.cost,
        "normalized response"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_framing_is_stripped() {
        let raw = "event: message_start\ndata: {\"a\":1}\n\n{\"b\":2}\ndata: [DONE]\n";
        let lines: Vec<&str> = stream_lines(raw).collect();
        assert_eq!(lines, [r#"{"a":1}"#, r#"{"b":2}"#]);
    }
}
