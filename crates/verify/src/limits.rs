//! Verification limits.

use serde::{Deserialize, Serialize};

/// Caps and thresholds used by the checkers. Missing fields take their
/// default when deserialized, so a config file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyLimits {
    /// Hard cap for exhaustive enumeration. Larger requests fail.
    pub max_exhaustive_combinations: u64,
    /// Completeness switches to representative sampling above this size.
    pub exhaustive_threshold: u64,
    /// Gaps recorded per fee before enumeration stops.
    pub max_reported_gaps: usize,
    /// Representative values drawn from each numeric domain.
    pub max_samples_per_domain: usize,
    /// Representative values of the varied input in a monotonicity check.
    pub monotonicity_samples: usize,
    /// Violations recorded before a monotonicity check stops.
    pub max_violations: usize,
}

impl Default for VerifyLimits {
    fn default() -> Self {
        VerifyLimits {
            max_exhaustive_combinations: 10_000_000,
            exhaustive_threshold: 1_000_000,
            max_reported_gaps: 100,
            max_samples_per_domain: 5,
            monotonicity_samples: 20,
            max_violations: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let limits: VerifyLimits =
            serde_json::from_str(r#"{ "max_reported_gaps": 5 }"#).unwrap();
        assert_eq!(limits.max_reported_gaps, 5);
        assert_eq!(limits.exhaustive_threshold, 1_000_000);
        assert_eq!(limits.max_violations, 10);
    }
}
