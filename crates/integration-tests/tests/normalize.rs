//! Complete responses normalize to the same view across wire formats

mod harness;

use harness::fixtures::{self, ARGUMENTS, CALL_ID, TEXT, get_weather};
use unison_llm::protocol::anthropic::AnthropicResponse;
use unison_llm::protocol::bedrock::BedrockResponse;
use unison_llm::protocol::cohere::CohereResponse;
use unison_llm::protocol::google::GoogleResponse;
use unison_llm::protocol::mistral::MistralResponse;
use unison_llm::protocol::openai::OpenAiResponse;
use unison_llm::{CallResponse, MessageHistory, Provider};

fn assert_weather_turn<R: MessageHistory>(response: &CallResponse<R>) {
    let provider = response.provider();

    assert_eq!(response.content(), TEXT, "{provider}");
    assert_eq!(response.input_tokens(), Some(12), "{provider}");
    assert_eq!(response.output_tokens(), Some(116), "{provider}");
    assert_eq!(response.finish_reasons().len(), 1, "{provider}");

    let calls = response.tool_calls().unwrap();
    assert_eq!(calls.len(), 1, "{provider}");
    assert_eq!(calls[0].id, CALL_ID, "{provider}");
    assert_eq!(calls[0].name(), "get_weather", "{provider}");
    assert_eq!(calls[0].arguments(), ARGUMENTS, "{provider}");

    let tool = response.tool().unwrap().as_ref().unwrap();
    assert_eq!(tool.id(), CALL_ID, "{provider}");
    assert_eq!(tool.get("city").unwrap(), "Oslo", "{provider}");

    assert!(response.cost().is_some_and(|cost| cost > 0.0), "{provider}");
}

#[test]
fn every_format_yields_the_same_turn() {
    let tools = [get_weather()];
    let [openai, anthropic, google, mistral, cohere, bedrock] = fixtures::CASES;

    assert_weather_turn(&fixtures::normalize::<OpenAiResponse>(
        openai.0,
        openai.1,
        fixtures::openai_response(),
        &tools,
    ));
    assert_weather_turn(&fixtures::normalize::<AnthropicResponse>(
        anthropic.0,
        anthropic.1,
        fixtures::anthropic_response(),
        &tools,
    ));
    assert_weather_turn(&fixtures::normalize::<GoogleResponse>(
        google.0,
        google.1,
        fixtures::google_response(),
        &tools,
    ));
    assert_weather_turn(&fixtures::normalize::<MistralResponse>(
        mistral.0,
        mistral.1,
        fixtures::mistral_response(),
        &tools,
    ));
    assert_weather_turn(&fixtures::normalize::<CohereResponse>(
        cohere.0,
        cohere.1,
        fixtures::cohere_response(),
        &tools,
    ));
    assert_weather_turn(&fixtures::normalize::<BedrockResponse>(
        bedrock.0,
        bedrock.1,
        fixtures::bedrock_response(),
        &tools,
    ));
}

#[test]
fn azure_and_groq_share_the_openai_format() {
    for provider in [Provider::Azure, Provider::Groq] {
        let response = fixtures::normalize::<OpenAiResponse>(provider, "gpt-4o", fixtures::openai_response(), &[]);
        assert_eq!(response.content(), TEXT);
        assert_eq!(response.provider(), provider);
    }
}

#[test]
fn reported_model_wins_over_requested() {
    let response =
        fixtures::normalize::<OpenAiResponse>(Provider::OpenAi, "gpt-4o-latest-alias", fixtures::openai_response(), &[]);
    assert_eq!(response.model(), "gpt-4o");

    let response = fixtures::normalize::<CohereResponse>(Provider::Cohere, "command-r-plus", fixtures::cohere_response(), &[]);
    assert_eq!(response.model(), "command-r-plus");
}

#[test]
fn cost_matches_the_price_table() {
    let response = fixtures::normalize::<OpenAiResponse>(Provider::OpenAi, "gpt-4o", fixtures::openai_response(), &[]);

    // 12 * $5 / 1M + 116 * $15 / 1M
    let cost = response.cost().unwrap();
    assert!((cost - 0.0018).abs() < 1e-12, "cost was {cost}");
}

#[test]
fn no_declared_tools_means_no_typed_tools() {
    let response = fixtures::normalize::<AnthropicResponse>(
        Provider::Anthropic,
        "claude-3-5-sonnet-20240620",
        fixtures::anthropic_response(),
        &[],
    );

    assert!(response.tool_calls().is_some());
    assert!(response.tools().is_none());
    assert!(response.tool().is_none());
}

#[test]
fn summary_is_plain_json() {
    let response = fixtures::normalize::<BedrockResponse>(
        Provider::Bedrock,
        "anthropic.claude-3-5-sonnet-20240620-v1:0",
        fixtures::bedrock_response(),
        &[get_weather()],
    );

    let value = serde_json::to_value(response.summary()).unwrap();
    assert_eq!(value["provider"], "bedrock");
    assert_eq!(value["model"], "anthropic.claude-3-5-sonnet-20240620-v1:0");
    assert_eq!(value["finish_reasons"][0], "tool_use");
    assert_eq!(value["tools"][0]["arguments"]["city"], "Oslo");
    assert!(value["id"].is_null());
}
