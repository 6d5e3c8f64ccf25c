use serde::{Deserialize, Serialize};

/// Token usage normalized across providers
///
/// Each count is `None` when the provider did not report it. A missing count is
/// never reported as zero, since zero would make a cost estimate look exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub input_tokens: Option<u32>,
    /// Tokens generated in the completion
    pub output_tokens: Option<u32>,
    /// Total tokens, as reported or derived from the two counts above
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Build usage from provider counts, deriving the total when both halves exist
    pub fn new(input_tokens: Option<u32>, output_tokens: Option<u32>, total_tokens: Option<u32>) -> Self {
        let total_tokens = total_tokens.or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input.saturating_add(output)),
            _ => None,
        });
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Whether the provider reported no counts at all
    pub const fn is_empty(&self) -> bool {
        self.input_tokens.is_none() && self.output_tokens.is_none() && self.total_tokens.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_derived_from_both_halves() {
        let usage = Usage::new(Some(12), Some(116), None);
        assert_eq!(usage.total_tokens, Some(128));
    }

    #[test]
    fn reported_total_wins() {
        let usage = Usage::new(Some(12), Some(116), Some(200));
        assert_eq!(usage.total_tokens, Some(200));
    }

    #[test]
    fn missing_half_leaves_total_unknown() {
        let usage = Usage::new(Some(12), None, None);
        assert_eq!(usage.total_tokens, None);
        assert_eq!(usage.output_tokens, None);
    }
}
