use indexmap::IndexMap;
use serde::Deserialize;

/// Price table configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Start from the built-in table of well-known models
    #[serde(default = "default_builtin")]
    pub builtin: bool,
    /// Per-model prices, keyed by the exact model identifier the provider reports
    ///
    /// Entries override built-in prices for the same model.
    #[serde(default)]
    pub models: IndexMap<String, ModelPriceConfig>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            models: IndexMap::new(),
        }
    }
}

const fn default_builtin() -> bool {
    true
}

/// Price of one model in USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelPriceConfig {
    /// USD per million prompt tokens
    pub input_per_mtok: f64,
    /// USD per million completion tokens
    pub output_per_mtok: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_keeps_builtin_table() {
        let config: PricingConfig = toml::from_str("").unwrap();
        assert!(config.builtin);
        assert!(config.models.is_empty());
    }

    #[test]
    fn models_keep_file_order() {
        let toml = r#"
            builtin = false

            [models."zeta-large"]
            input_per_mtok = 2.0
            output_per_mtok = 6.0

            [models."alpha-mini"]
            input_per_mtok = 0.1
            output_per_mtok = 0.4
        "#;

        let config: PricingConfig = toml::from_str(toml).unwrap();
        assert!(!config.builtin);
        let keys: Vec<&str> = config.models.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta-large", "alpha-mini"]);
        assert!((config.models["alpha-mini"].output_per_mtok - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_price_field_is_rejected() {
        let toml = r#"
            [models."gpt-4o"]
            input_per_mtok = 5.0
            output_per_mtok = 15.0
            cached_per_mtok = 2.5
        "#;

        let err = toml::from_str::<PricingConfig>(toml).unwrap_err();
        assert!(err.to_string().contains("cached_per_mtok"));
    }
}
