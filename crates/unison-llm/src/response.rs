//! Normalized view over one provider response

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::{Map, Value};
use unison_config::Config;

use crate::history::MessageHistory;
use crate::pricing::PriceTable;
use crate::tools::{ToolInstance, ToolMatchPolicy, ToolOutcome, match_tool_calls};
use crate::types::{CallParams, Provider, ToolCall, Usage};

/// Inputs to normalization that do not come from the response itself
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Prices used for [`CallResponse::cost`]
    pub pricing: Arc<PriceTable>,
    /// Handling of calls to undeclared tools
    pub tool_policy: ToolMatchPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            pricing: PriceTable::shared_builtin(),
            tool_policy: ToolMatchPolicy::default(),
        }
    }
}

impl NormalizeOptions {
    /// Options described by a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            pricing: Arc::new(PriceTable::from_config(&config.pricing)),
            tool_policy: config.tools.policy,
        }
    }

    /// Replace the price table
    #[must_use]
    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = Arc::new(pricing);
        self
    }

    /// Replace the tool policy
    #[must_use]
    pub const fn with_tool_policy(mut self, tool_policy: ToolMatchPolicy) -> Self {
        self.tool_policy = tool_policy;
        self
    }
}

/// One provider response with uniform accessors
///
/// Created once per request (or per completed stream) and read-only
/// afterward. Raw tool calls and matched tools are derived on first access
/// and cached.
#[derive(Debug)]
pub struct CallResponse<R> {
    response: R,
    params: CallParams,
    options: NormalizeOptions,
    tool_calls: OnceLock<Vec<ToolCall>>,
    tools: OnceLock<Vec<ToolOutcome>>,
}

impl<R: MessageHistory> CallResponse<R> {
    /// Wrap a decoded response with default options
    pub fn new(response: R, params: CallParams) -> Self {
        Self::with_options(response, params, NormalizeOptions::default())
    }

    /// Wrap a decoded response
    pub fn with_options(response: R, params: CallParams, options: NormalizeOptions) -> Self {
        if params.provider.wire_format() != R::FORMAT {
            tracing::warn!(
                provider = %params.provider,
                expected = %params.provider.wire_format(),
                actual = %R::FORMAT,
                "response wire format does not match the call's provider"
            );
        }

        Self {
            response,
            params,
            options,
            tool_calls: OnceLock::new(),
            tools: OnceLock::new(),
        }
    }

    /// The provider response
    pub const fn response(&self) -> &R {
        &self.response
    }

    /// Params of the call that produced this response
    pub const fn params(&self) -> &CallParams {
        &self.params
    }

    /// Unwrap the provider response
    pub fn into_response(self) -> R {
        self.response
    }

    /// Provider the call was dispatched to
    pub const fn provider(&self) -> Provider {
        self.params.provider
    }

    /// Text of the first choice
    pub fn content(&self) -> String {
        self.response.content()
    }

    /// Finish reason of every choice
    pub fn finish_reasons(&self) -> Vec<String> {
        self.response.finish_reasons()
    }

    /// Token usage
    pub fn usage(&self) -> Option<Usage> {
        self.response.usage()
    }

    /// Prompt tokens
    pub fn input_tokens(&self) -> Option<u32> {
        self.usage().and_then(|u| u.input_tokens)
    }

    /// Completion tokens
    pub fn output_tokens(&self) -> Option<u32> {
        self.usage().and_then(|u| u.output_tokens)
    }

    /// Reported model, or the requested one when the provider omits it
    pub fn model(&self) -> &str {
        self.response.model().unwrap_or(&self.params.model)
    }

    /// Response identifier
    pub fn id(&self) -> Option<&str> {
        self.response.id()
    }

    /// Estimated cost in USD
    ///
    /// Priced by the reported model, then by the requested model. `None` when
    /// usage is missing, either token count is missing, or neither model is in
    /// the price table.
    pub fn cost(&self) -> Option<f64> {
        let usage = self.usage()?;
        let pricing = &self.options.pricing;

        let cost = pricing
            .cost(self.model(), &usage)
            .or_else(|| pricing.cost(&self.params.model, &usage));

        if cost.is_none() {
            tracing::debug!(
                provider = %self.params.provider,
                model = %self.model(),
                "cost unknown for response"
            );
        }

        cost
    }

    /// Raw tool calls of the first choice; `None` when there are none
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        let calls = self.tool_calls.get_or_init(|| self.response.tool_calls());
        (!calls.is_empty()).then_some(calls.as_slice())
    }

    /// Raw tool calls matched against the declared tools, in call order
    ///
    /// `None` when the call declared no tools or the response made no tool
    /// calls. Otherwise one entry per call, except calls to undeclared tools
    /// under the lenient policy, which are dropped.
    pub fn tools(&self) -> Option<&[ToolOutcome]> {
        if self.params.tools.is_empty() {
            return None;
        }
        let calls = self.tool_calls()?;

        let outcomes = self
            .tools
            .get_or_init(|| match_tool_calls(calls, &self.params.tools, self.options.tool_policy));
        Some(outcomes.as_slice())
    }

    /// First entry of [`tools`](Self::tools)
    pub fn tool(&self) -> Option<&ToolOutcome> {
        self.tools()?.first()
    }

    /// Apply a caller-supplied parser to this response
    pub fn parse_with<T>(&self, parser: impl FnOnce(&Self) -> T) -> T {
        parser(self)
    }

    /// The first choice as a prior assistant turn
    pub fn message_param(&self) -> R::MessageParam {
        self.response.message_param()
    }

    /// Tool outputs as provider-native history entries
    pub fn tool_message_params(&self, results: &[(ToolInstance, String)]) -> Vec<R::MessageParam> {
        self.response.tool_message_params(results)
    }

    /// Messages to append before the follow-up call: the assistant turn, then
    /// the tool results
    pub fn follow_up_messages(&self, results: &[(ToolInstance, String)]) -> Vec<R::MessageParam> {
        let mut messages = vec![self.message_param()];
        messages.extend(self.tool_message_params(results));
        messages
    }

    /// Serializable snapshot of every normalized accessor
    pub fn summary(&self) -> ResponseSummary {
        ResponseSummary {
            provider: self.params.provider,
            model: self.model().to_owned(),
            id: self.id().map(str::to_owned),
            content: self.content(),
            finish_reasons: self.finish_reasons(),
            usage: self.usage(),
            cost: self.cost(),
            tool_calls: self.tool_calls().map(<[ToolCall]>::to_vec).unwrap_or_default(),
            tools: self
                .tools()
                .map(|outcomes| outcomes.iter().map(ToolSummary::from).collect()),
        }
    }
}

/// Every normalized accessor of a [`CallResponse`] as plain data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    /// Provider the call was dispatched to
    pub provider: Provider,
    /// Reported or requested model
    pub model: String,
    /// Response identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Text of the first choice
    pub content: String,
    /// Finish reason of every choice
    pub finish_reasons: Vec<String>,
    /// Token usage
    pub usage: Option<Usage>,
    /// Estimated cost in USD
    pub cost: Option<f64>,
    /// Raw tool calls
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Matched tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSummary>>,
}

/// One matched tool call, or the reason it was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    /// Raw call id
    pub id: String,
    /// Called tool name
    pub name: String,
    /// Validated arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
    /// Rejection reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ToolOutcome> for ToolSummary {
    fn from(outcome: &ToolOutcome) -> Self {
        match outcome {
            Ok(instance) => Self {
                id: instance.id().to_owned(),
                name: instance.name().to_owned(),
                arguments: Some(instance.arguments().clone()),
                error: None,
            },
            Err(e) => Self {
                id: e.tool_call().id.clone(),
                name: e.tool_call().name().to_owned(),
                arguments: None,
                error: Some(e.to_string()),
            },
        }
    }
}
