//! Configuration files for integration tests

use std::fmt::Write as _;
use std::io::Write as _;

use tempfile::NamedTempFile;
use unison_config::Config;

/// Builder for TOML configuration written to a temporary file
#[derive(Default)]
pub struct ConfigBuilder {
    builtin_prices: Option<bool>,
    prices: Vec<(String, f64, f64)>,
    strict_tools: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price `model` per million input and output tokens
    pub fn with_price(mut self, model: &str, input_per_mtok: f64, output_per_mtok: f64) -> Self {
        self.prices.push((model.to_owned(), input_per_mtok, output_per_mtok));
        self
    }

    /// Drop the built-in price table
    pub fn without_builtin_prices(mut self) -> Self {
        self.builtin_prices = Some(false);
        self
    }

    /// Report undeclared tool calls instead of dropping them
    pub fn with_strict_tools(mut self) -> Self {
        self.strict_tools = true;
        self
    }

    pub fn toml(&self) -> String {
        let mut out = String::new();

        out.push_str("[pricing]\n");
        if let Some(builtin) = self.builtin_prices {
            writeln!(out, "builtin = {builtin}").unwrap();
        }
        for (model, input, output) in &self.prices {
            writeln!(
                out,
                "models.\"{model}\" = {{ input_per_mtok = {input:?}, output_per_mtok = {output:?} }}"
            )
            .unwrap();
        }

        if self.strict_tools {
            out.push_str("\n[tools]\npolicy = \"strict\"\n");
        }

        out
    }

    /// Write the file and load it back through [`Config::load`]
    pub fn load(&self) -> Config {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(self.toml().as_bytes()).unwrap();
        Config::load(file.path()).unwrap()
    }
}
