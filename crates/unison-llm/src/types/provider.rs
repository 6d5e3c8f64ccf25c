use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// LLM vendor a call is dispatched to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    /// `OpenAI` chat completions
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Mistral chat API
    Mistral,
    /// Cohere v2 chat API
    Cohere,
    /// Groq (OpenAI-compatible)
    Groq,
    /// Google Gemini API
    Gemini,
    /// Google Vertex AI (Gemini models)
    Vertex,
    /// Azure `OpenAI`
    Azure,
    /// AWS Bedrock Converse API
    Bedrock,
}

impl Provider {
    /// Wire format this provider speaks
    pub const fn wire_format(self) -> WireFormat {
        match self {
            Self::OpenAi | Self::Groq | Self::Azure => WireFormat::OpenAi,
            Self::Anthropic => WireFormat::Anthropic,
            Self::Gemini | Self::Vertex => WireFormat::Google,
            Self::Mistral => WireFormat::Mistral,
            Self::Cohere => WireFormat::Cohere,
            Self::Bedrock => WireFormat::Bedrock,
        }
    }
}

/// Distinct request/response shapes; several providers share one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WireFormat {
    /// `OpenAI` chat completions shape
    OpenAi,
    /// Anthropic Messages shape
    Anthropic,
    /// Google `generateContent` shape
    Google,
    /// Mistral chat shape
    Mistral,
    /// Cohere v2 chat shape
    Cohere,
    /// Bedrock Converse shape
    Bedrock,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in Provider::iter() {
            let name = provider.to_string();
            assert_eq!(Provider::from_str(&name).unwrap(), provider);
        }
        assert_eq!(Provider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(Provider::from_str("Anthropic").unwrap(), Provider::Anthropic);
        assert!(Provider::from_str("watsonx").is_err());
    }

    #[test]
    fn compatible_providers_share_a_wire_format() {
        assert_eq!(Provider::Groq.wire_format(), WireFormat::OpenAi);
        assert_eq!(Provider::Azure.wire_format(), WireFormat::OpenAi);
        assert_eq!(Provider::Vertex.wire_format(), WireFormat::Google);
    }
}
