#![allow(clippy::must_use_candidate)]

mod loader;
pub mod pricing;
pub mod telemetry;
pub mod tools;

use serde::Deserialize;

pub use pricing::*;
pub use telemetry::*;
pub use tools::*;

/// Top-level unison configuration
///
/// Every section is optional; an empty file yields the built-in price table,
/// the lenient tool policy and `info`-level pretty logs.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model price table
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Tool-call matching
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
