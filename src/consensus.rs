//! Consensus policy across the model panel.
//!
//! The dashboard's historical rule: flag elevated risk when at least two
//! models vote for class 1. The threshold is an absolute count, not a
//! fraction of the panel; changing the model set changes the effective
//! majority semantics, which is why the constant is an explicit, configurable
//! policy here instead of a literal buried in a handler.

use serde::{Deserialize, Serialize};

/// Aggregate risk verdict across the loaded model panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskVerdict {
    #[serde(rename = "elevated risk")]
    Elevated,
    #[serde(rename = "low risk")]
    Low,
}

impl std::fmt::Display for RiskVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskVerdict::Elevated => write!(f, "elevated risk"),
            RiskVerdict::Low => write!(f, "low risk"),
        }
    }
}

/// Vote-count threshold policy
#[derive(Debug, Clone, Copy)]
pub struct ConsensusPolicy {
    threshold: usize,
}

impl ConsensusPolicy {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Derive the aggregate verdict from per-model class labels
    pub fn verdict(&self, labels: &[u8]) -> RiskVerdict {
        let positives: usize = labels.iter().map(|&l| usize::from(l)).sum();
        if positives >= self.threshold {
            RiskVerdict::Elevated
        } else {
            RiskVerdict::Low
        }
    }
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        // Historical dashboard constant, kept as deliberate policy.
        Self { threshold: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_below_threshold_are_low_risk() {
        let policy = ConsensusPolicy::default();
        assert_eq!(policy.verdict(&[0, 0, 0, 0]), RiskVerdict::Low);
        assert_eq!(policy.verdict(&[1, 0, 0, 0]), RiskVerdict::Low);
        assert_eq!(policy.verdict(&[0, 0, 0, 1]), RiskVerdict::Low);
    }

    #[test]
    fn sums_at_or_above_threshold_are_elevated() {
        let policy = ConsensusPolicy::default();
        assert_eq!(policy.verdict(&[1, 1, 0, 0]), RiskVerdict::Elevated);
        assert_eq!(policy.verdict(&[1, 1, 1, 0]), RiskVerdict::Elevated);
        assert_eq!(policy.verdict(&[1, 1, 1, 1]), RiskVerdict::Elevated);
    }

    #[test]
    fn threshold_is_independent_of_panel_size() {
        let policy = ConsensusPolicy::default();
        // Two positives trip the verdict no matter how many models voted.
        assert_eq!(policy.verdict(&[1, 1]), RiskVerdict::Elevated);
        assert_eq!(
            policy.verdict(&[1, 1, 0, 0, 0, 0, 0, 0]),
            RiskVerdict::Elevated
        );
        assert_eq!(policy.verdict(&[1, 0, 0, 0, 0, 0]), RiskVerdict::Low);
    }

    #[test]
    fn custom_threshold_is_honored() {
        let policy = ConsensusPolicy::new(3);
        assert_eq!(policy.verdict(&[1, 1, 0, 0]), RiskVerdict::Low);
        assert_eq!(policy.verdict(&[1, 1, 1, 0]), RiskVerdict::Elevated);
    }

    #[test]
    fn verdict_serializes_to_the_display_labels() {
        assert_eq!(
            serde_json::to_string(&RiskVerdict::Elevated).unwrap(),
            "\"elevated risk\""
        );
        assert_eq!(
            serde_json::to_string(&RiskVerdict::Low).unwrap(),
            "\"low risk\""
        );
    }
}
