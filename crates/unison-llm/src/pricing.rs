//! Model price table and cost estimation

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use unison_config::PricingConfig;

use crate::types::Usage;

/// USD per million tokens for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    /// Price per million prompt tokens
    pub input_per_mtok: f64,
    /// Price per million completion tokens
    pub output_per_mtok: f64,
}

impl ModelPrice {
    /// Price from per-million-token rates
    pub const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }

    /// Price from per-thousand-token rates
    pub fn per_ktok(input_per_ktok: f64, output_per_ktok: f64) -> Self {
        Self::new(input_per_ktok * 1_000.0, output_per_ktok * 1_000.0)
    }

    /// Cost in USD of the given token counts
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        f64::from(input_tokens) * self.input_per_mtok / 1_000_000.0
            + f64::from(output_tokens) * self.output_per_mtok / 1_000_000.0
    }
}

/// Well-known list prices, USD per million tokens
const BUILTIN_PRICES: &[(&str, f64, f64)] = &[
    // OpenAI
    ("gpt-4o", 5.0, 15.0),
    ("gpt-4o-2024-05-13", 5.0, 15.0),
    ("gpt-4o-2024-08-06", 2.5, 10.0),
    ("gpt-4o-mini", 0.15, 0.6),
    ("gpt-4o-mini-2024-07-18", 0.15, 0.6),
    ("gpt-4-turbo", 10.0, 30.0),
    ("gpt-3.5-turbo", 0.5, 1.5),
    // Anthropic
    ("claude-3-5-sonnet-20240620", 3.0, 15.0),
    ("claude-3-opus-20240229", 15.0, 75.0),
    ("claude-3-sonnet-20240229", 3.0, 15.0),
    ("claude-3-haiku-20240307", 0.25, 1.25),
    // Mistral
    ("mistral-large-latest", 3.0, 9.0),
    ("mistral-small-latest", 1.0, 3.0),
    ("open-mistral-nemo", 0.3, 0.3),
    ("codestral-latest", 1.0, 3.0),
    // Cohere
    ("command-r-plus", 2.5, 10.0),
    ("command-r", 0.15, 0.6),
    // Google
    ("gemini-1.5-pro", 3.5, 10.5),
    ("gemini-1.5-flash", 0.075, 0.3),
    ("gemini-1.0-pro", 0.5, 1.5),
    // Groq
    ("llama-3.1-8b-instant", 0.05, 0.08),
    ("llama-3.1-70b-versatile", 0.59, 0.79),
    ("mixtral-8x7b-32768", 0.24, 0.24),
    ("gemma2-9b-it", 0.2, 0.2),
    // Bedrock
    ("anthropic.claude-3-5-sonnet-20240620-v1:0", 3.0, 15.0),
    ("anthropic.claude-3-haiku-20240307-v1:0", 0.25, 1.25),
    ("meta.llama3-1-70b-instruct-v1:0", 0.99, 0.99),
];

/// Model identifier to price lookup
///
/// Keys are matched exactly against the model the provider reports (falling
/// back to the requested model); there is no prefix or alias matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: HashMap<String, ModelPrice>,
}

impl PriceTable {
    /// Table with no entries; every cost is unknown
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table pre-populated with well-known list prices
    pub fn builtin() -> Self {
        let prices = BUILTIN_PRICES
            .iter()
            .map(|&(model, input, output)| (model.to_owned(), ModelPrice::new(input, output)))
            .collect();
        Self { prices }
    }

    /// Shared handle to the built-in table
    pub fn shared_builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<PriceTable>> = OnceLock::new();
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Table described by a configuration section
    ///
    /// Configured models override built-in entries of the same name.
    pub fn from_config(config: &PricingConfig) -> Self {
        let mut table = if config.builtin { Self::builtin() } else { Self::empty() };

        for (model, price) in &config.models {
            table.insert(model.clone(), ModelPrice::new(price.input_per_mtok, price.output_per_mtok));
        }

        table
    }

    /// Add or replace a model's price
    pub fn insert(&mut self, model: impl Into<String>, price: ModelPrice) {
        self.prices.insert(model.into(), price);
    }

    /// Builder form of [`Self::insert`]
    #[must_use]
    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.insert(model, price);
        self
    }

    /// Price for a model, if listed
    pub fn get(&self, model: &str) -> Option<ModelPrice> {
        self.prices.get(model).copied()
    }

    /// Number of priced models
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Cost of `usage` on `model`
    ///
    /// `None` when the model is not listed or either token count is unknown.
    pub fn cost(&self, model: &str, usage: &Usage) -> Option<f64> {
        let price = self.get(model)?;
        let input = usage.input_tokens?;
        let output = usage.output_tokens?;
        Some(price.cost(input, output))
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use unison_config::ModelPriceConfig;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn cost_uses_per_thousand_rates() {
        let price = ModelPrice::per_ktok(0.005, 0.015);
        let cost = price.cost(12, 116);
        assert!(approx(cost, 12.0 * 0.005 / 1000.0 + 116.0 * 0.015 / 1000.0));
        assert!(approx(cost, 0.0018));
    }

    #[test]
    fn unknown_model_has_no_cost() {
        let usage = Usage::new(Some(10), Some(10), None);
        assert_eq!(PriceTable::builtin().cost("my-finetune", &usage), None);
    }

    #[test]
    fn missing_count_has_no_cost() {
        let table = PriceTable::builtin();
        assert_eq!(table.cost("gpt-4o", &Usage::new(Some(10), None, None)), None);
        assert_eq!(table.cost("gpt-4o", &Usage::default()), None);
    }

    #[test]
    fn zero_tokens_cost_zero() {
        let cost = PriceTable::builtin().cost("gpt-4o", &Usage::new(Some(0), Some(0), None));
        assert_eq!(cost.map(|c| approx(c, 0.0)), Some(true));
    }

    #[test]
    fn builtin_lists_common_models() {
        let table = PriceTable::builtin();
        for model in ["gpt-4o", "claude-3-5-sonnet-20240620", "gemini-1.5-flash", "command-r-plus"] {
            assert!(table.get(model).is_some(), "{model} should be priced");
        }
        assert_eq!(table.len(), BUILTIN_PRICES.len());
    }

    #[test]
    fn config_overrides_and_extends_builtin() {
        let mut models = IndexMap::new();
        models.insert(
            "gpt-4o".to_owned(),
            ModelPriceConfig {
                input_per_mtok: 2.5,
                output_per_mtok: 10.0,
            },
        );
        models.insert(
            "my-finetune".to_owned(),
            ModelPriceConfig {
                input_per_mtok: 1.0,
                output_per_mtok: 2.0,
            },
        );

        let table = PriceTable::from_config(&PricingConfig { builtin: true, models });
        assert_eq!(table.get("gpt-4o"), Some(ModelPrice::new(2.5, 10.0)));
        assert_eq!(table.get("my-finetune"), Some(ModelPrice::new(1.0, 2.0)));
        assert!(table.get("gpt-4o-mini").is_some());
    }

    #[test]
    fn config_without_builtin_starts_empty() {
        let table = PriceTable::from_config(&PricingConfig {
            builtin: false,
            models: IndexMap::new(),
        });
        assert!(table.is_empty());
    }

    #[test]
    fn shared_builtin_is_reused() {
        let a = PriceTable::shared_builtin();
        let b = PriceTable::shared_builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
