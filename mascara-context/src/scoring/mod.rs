// mascara-context/src/scoring/mod.rs
use libm::exp;

/// Weights for the confidence calculation.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub bias: f64,
    /// Contribution of each capitalized token in the span.
    pub token_weight: f64,
    /// Contribution of a cue keyword (person context or thoroughfare type).
    pub cue_weight: f64,
    /// Contribution of a trailing house number (addresses only).
    pub number_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            bias: -1.5,
            token_weight: 0.9,
            cue_weight: 1.8,
            number_weight: 1.2,
        }
    }
}

/// Evidence gathered for one candidate span.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evidence {
    pub capitalized_tokens: usize,
    pub has_cue: bool,
    pub has_number: bool,
}

/// Maps evidence onto a confidence in `(0, 1)` with a logistic curve.
pub fn calculate_confidence(evidence: &Evidence, weights: &ScoringWeights) -> f64 {
    let mut z = weights.bias + weights.token_weight * evidence.capitalized_tokens as f64;
    if evidence.has_cue {
        z += weights.cue_weight;
    }
    if evidence.has_number {
        z += weights.number_weight;
    }
    1.0 / (1.0 + exp(-z))
}
