// mascara-core/src/engine.rs
//! Defines the core `DetectionEngine` trait.
//!
//! The trait decouples callers (batch runner, headless helpers, the CLI) from
//! the concrete pipeline, so a test double or an alternative engine can be
//! passed anywhere an engine is expected.
//!
//! License: MIT OR APACHE 2.0

use crate::config::MascaraConfig;
use crate::entity::{Analysis, DetectionResult, PiiType};
use crate::masking::{self, MaskingOptions, MaskingPolicy};

/// A detection and masking pipeline over single records.
///
/// Implementations are immutable after construction and shared across threads.
/// Per-record problems never surface as errors; they are reported through
/// `DetectionResult::warnings`.
pub trait DetectionEngine: Send + Sync {
    /// Runs the full pipeline and returns the result together with every span
    /// found, as needed to rewrite the text.
    fn analyze(&self, text: &str) -> Analysis;

    /// The configuration the engine was built from.
    fn config(&self) -> &MascaraConfig;

    fn detect(&self, text: &str) -> DetectionResult {
        self.analyze(text).result
    }

    /// Options for `policy` carrying this engine's sentinel.
    fn masking_options(&self, policy: MaskingPolicy) -> MaskingOptions {
        MaskingOptions::new(policy).with_sentinel(self.config().masking.sentinel.clone())
    }

    /// Detects and rewrites `text` in one pass.
    fn mask_text(&self, text: &str, options: &MaskingOptions) -> String {
        let analysis = self.analyze(text);
        masking::mask_text(text, &analysis.entities, options)
    }

    /// Masks a value already known to be of `pii_type`.
    fn mask_value(&self, pii_type: PiiType, value: &str, policy: MaskingPolicy) -> String {
        masking::mask_value(pii_type, value, &self.masking_options(policy))
    }
}
