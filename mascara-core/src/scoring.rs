//! Risk scoring.
//!
//! `risk_score = min(1, Σ weight(type, verdict) × count / threshold)`. Pattern
//! types count every occurrence; contextual types count distinct values.

pub use crate::config::{ScoringConfig, TypeWeights};
use crate::entity::{DetectionResult, PiiType, Verdict};

/// Unsaturated weighted sum of everything recorded in `result`.
pub fn weighted_sum(result: &DetectionResult, config: &ScoringConfig) -> f64 {
    PiiType::ALL
        .iter()
        .map(|&pii_type| match result.verdict_lists(pii_type) {
            Some(lists) => {
                config.weight(pii_type, Verdict::Verified) * lists.verified.len() as f64
                    + config.weight(pii_type, Verdict::Suspect) * lists.suspect.len() as f64
            }
            None => config.weight(pii_type, Verdict::Suspect) * result.count(pii_type) as f64,
        })
        .sum()
}

/// Sets `has_pii` and `risk_score` on `result` from its current contents.
pub fn score(result: &mut DetectionResult, config: &ScoringConfig) {
    result.has_pii = !result.is_empty();
    result.risk_score = if result.has_pii {
        (weighted_sum(result, config) / config.threshold).min(1.0)
    } else {
        0.0
    };
}
