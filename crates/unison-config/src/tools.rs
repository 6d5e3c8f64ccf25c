use serde::Deserialize;

/// Tool-call matching configuration
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// What to do with calls naming an undeclared tool
    #[serde(default)]
    pub policy: ToolMatchPolicy,
}

/// Handling of tool calls that match no declared tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMatchPolicy {
    /// Drop unmatched calls from the typed tool list
    #[default]
    Lenient,
    /// Report unmatched calls as errors in the typed tool list
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_lenient() {
        let config: ToolsConfig = toml::from_str("").unwrap();
        assert_eq!(config.policy, ToolMatchPolicy::Lenient);
    }

    #[test]
    fn strict_policy_parses() {
        let config: ToolsConfig = toml::from_str(r#"policy = "strict""#).unwrap();
        assert_eq!(config.policy, ToolMatchPolicy::Strict);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(toml::from_str::<ToolsConfig>(r#"policy = "loose""#).is_err());
    }
}
