use serde::Serialize;

use super::provider::Provider;
use super::tool::ToolChoice;
use crate::response_model::BoundResponseModel;
use crate::schema::{ProviderTools, ToolSchema, lower_tools};

/// Per-call request configuration
///
/// Built by the outbound request layer and frozen once the request is sent.
/// The normalizer reads the provider, requested model and declared tools from
/// it; the remaining fields are carried for the request builder.
#[derive(Debug, Clone, Serialize)]
pub struct CallParams {
    /// Provider the call is dispatched to
    pub provider: Provider,
    /// Requested model identifier
    pub model: String,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tools the model may call
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
    /// Tool selection directive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Ask the provider for a JSON object reply
    pub json_mode: bool,
}

impl CallParams {
    /// Params for a plain call to `model` on `provider`
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
            temperature: None,
            tools: Vec::new(),
            tool_choice: None,
            json_mode: false,
        }
    }

    /// Set the generation token limit
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Declare a tool the model may call
    #[must_use]
    pub fn with_tool(mut self, tool: ToolSchema) -> Self {
        self.tools.push(tool);
        self
    }

    /// Declare several tools at once
    #[must_use]
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolSchema>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Set the tool selection directive
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Configure the call to produce `model`'s structured output
    ///
    /// In tool mode the model's schema is declared as the only tool and the
    /// call forces it; in json mode the provider is asked for a JSON reply.
    #[must_use]
    pub fn with_response_model(mut self, model: &BoundResponseModel) -> Self {
        if model.json_mode() {
            self.json_mode = true;
        } else {
            self.tools = vec![model.tool_schema()];
            self.tool_choice = Some(ToolChoice::Tool(model.name().to_owned()));
        }
        self
    }

    /// Declared tools and choice lowered into this provider's request shape
    ///
    /// Returns `None` when no tools are declared.
    pub fn provider_tools(&self) -> Option<ProviderTools> {
        if self.tools.is_empty() {
            return None;
        }
        Some(lower_tools(
            self.provider.wire_format(),
            &self.tools,
            self.tool_choice.as_ref(),
        ))
    }
}
