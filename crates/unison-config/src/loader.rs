use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::parse(&raw)?;

        tracing::debug!(
            path = %path.display(),
            priced_models = config.pricing.models.len(),
            "loaded configuration"
        );

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a price is negative or not finite, or the log
    /// filter is empty
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_pricing()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_pricing(&self) -> anyhow::Result<()> {
        for (model, price) in &self.pricing.models {
            if model.trim().is_empty() {
                anyhow::bail!("pricing entry with an empty model name");
            }

            for (field, value) in [
                ("input_per_mtok", price.input_per_mtok),
                ("output_per_mtok", price.output_per_mtok),
            ] {
                if !value.is_finite() || value < 0.0 {
                    anyhow::bail!("price `{field}` for model '{model}' must be a finite, non-negative number");
                }
            }
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if self.telemetry.filter.trim().is_empty() {
            anyhow::bail!("telemetry.filter must not be empty");
        }

        Ok(())
    }
}
