//! Candidate extraction for the pattern-based PII types.
//!
//! Each type has its own extractor so a failure in one never hides the others.
//! After extraction, candidates from different types that overlap are resolved
//! by `PiiType::precedence`, so every span belongs to exactly one type.

pub mod compiler;

use log::warn;
use regex::Regex;

use crate::entity::{log_candidate_debug, Candidate, DetectionWarning, PiiType};
use crate::errors::MascaraError;

pub use compiler::{compile_patterns, get_or_compile_patterns, CompiledPattern, CompiledPatterns};

/// Finds candidates of a single PII type.
pub trait CandidateExtractor: Send + Sync {
    fn pii_type(&self) -> PiiType;

    /// Returns candidates in text order. Same-type matches never overlap.
    fn extract(&self, text: &str) -> Result<Vec<Candidate>, MascaraError>;
}

/// Regex-backed extractor. Leftmost-first, non-overlapping matches.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pii_type: PiiType,
    regex: Regex,
}

impl RegexExtractor {
    pub fn new(pii_type: PiiType, regex: Regex) -> Self {
        Self { pii_type, regex }
    }

    pub fn from_compiled(pattern: &CompiledPattern) -> Self {
        Self::new(pattern.pii_type, pattern.regex.clone())
    }
}

impl CandidateExtractor for RegexExtractor {
    fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    fn extract(&self, text: &str) -> Result<Vec<Candidate>, MascaraError> {
        Ok(self
            .regex
            .find_iter(text)
            .map(|m| Candidate {
                pii_type: self.pii_type,
                value: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
            .collect())
    }
}

/// One `RegexExtractor` per compiled pattern.
pub fn regex_extractors(compiled: &CompiledPatterns) -> Vec<Box<dyn CandidateExtractor>> {
    compiled
        .patterns
        .iter()
        .map(|p| Box::new(RegexExtractor::from_compiled(p)) as Box<dyn CandidateExtractor>)
        .collect()
}

/// Runs every extractor over `text`.
///
/// A failing extractor contributes an `ExtractionFailed` warning instead of
/// candidates. The returned candidates are in text order with cross-type
/// overlaps removed.
pub fn extract_candidates(
    text: &str,
    extractors: &[Box<dyn CandidateExtractor>],
) -> (Vec<Candidate>, Vec<DetectionWarning>) {
    let mut all = Vec::new();
    let mut warnings = Vec::new();

    for extractor in extractors {
        match extractor.extract(text) {
            Ok(candidates) => all.extend(candidates),
            Err(e) => {
                warn!("Extraction for '{}' failed, continuing without it: {}", extractor.pii_type(), e);
                warnings.push(DetectionWarning::ExtractionFailed {
                    pii_type: extractor.pii_type(),
                    message: e.to_string(),
                });
            }
        }
    }

    let candidates = resolve_overlaps(all);
    for candidate in &candidates {
        log_candidate_debug("[mascara_core::extractor]", candidate);
    }
    (candidates, warnings)
}

/// Resolves collisions between spans of different types. A span strictly
/// inside a longer one is dropped (longest match first); the remaining
/// collisions keep the highest-precedence candidate. Text order is restored.
fn resolve_overlaps(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let inside: Vec<bool> = candidates
        .iter()
        .map(|c| candidates.iter().any(|other| strictly_contains(other, c)))
        .collect();
    let mut candidates: Vec<Candidate> = candidates
        .into_iter()
        .zip(inside)
        .filter_map(|(c, inside)| (!inside).then_some(c))
        .collect();

    candidates.sort_by_key(|c| (c.pii_type.precedence(), c.start));
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|a| a.overlaps(candidate.start, candidate.end)) {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|c| c.start);
    accepted
}

fn strictly_contains(outer: &Candidate, inner: &Candidate) -> bool {
    outer.start <= inner.start && inner.end <= outer.end && outer.end - outer.start > inner.end - inner.start
}
