// mascara-core/src/lib.rs
//! # mascara Core Library
//!
//! `mascara-core` detects, validates, scores and masks Brazilian personal data
//! (CPF, RG, e-mail, telefone, person names and addresses) in free text, for
//! LGPD compliance workflows. It is pure and performs no I/O of its own apart
//! from optional configuration loading.
//!
//! ## Modules
//!
//! * `config`: `MascaraConfig` with patterns, risk weights, recognizer, batch and masking settings.
//! * `entity`: PII types, verdicts, candidates and the fixed-shape `DetectionResult`.
//! * `extractor`: per-type candidate extraction and pattern compilation.
//! * `validators`: CPF check digits and the structural checks for RG, e-mail and telefone.
//! * `recognizer`: contextual recognition of names and addresses.
//! * `scoring`: the saturating risk score.
//! * `masking`: `PARCIAL` and `PROTECAO_TOTAL` policies, value and full-text masking.
//! * `engine`: the `DetectionEngine` trait.
//! * `engines`: concrete engines (`HybridEngine`).
//! * `batch`: chunked, order-preserving batch processing with progress and cancellation.
//! * `headless`: one-shot helpers over a lazily built default engine.
//!
//! ## Usage Example
//!
//! ```rust
//! use mascara_core::{DetectionEngine, HybridEngine, MascaraConfig, MaskingPolicy};
//!
//! fn main() -> Result<(), mascara_core::MascaraError> {
//!     let engine = HybridEngine::new(MascaraConfig::default())?;
//!     let text = "Meu CPF é 123.456.789-09 e email teste@teste";
//!
//!     let result = engine.detect(text);
//!     assert_eq!(result.cpf.verified, vec!["123.456.789-09".to_string()]);
//!
//!     let options = engine.masking_options(MaskingPolicy::Parcial);
//!     assert_eq!(engine.mask_text(text, &options), "Meu CPF é ***.456.789-** e email te***@teste");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems (bad patterns, weights, chunk size, unknown policy)
//! are reported as `MascaraError` before any record is processed. Problems
//! inside a record, such as a failing recognizer, never abort a batch; they
//! show up in `DetectionResult::warnings`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod batch;
pub mod config;
pub mod engine;
pub mod engines;
pub mod entity;
pub mod errors;
pub mod extractor;
pub mod headless;
pub mod masking;
pub mod recognizer;
pub mod scoring;
pub mod validators;

pub use config::{
    merge_config, BatchConfig, MascaraConfig, MaskingConfig, PatternConfig, RecognizerConfig, ScoringConfig,
    TypeWeights, DEFAULT_SENTINEL, MAX_PATTERN_LENGTH,
};

pub use errors::MascaraError;

pub use entity::{
    redact_sensitive, Analysis, Candidate, DetectedEntity, DetectionResult, DetectionWarning, PiiType, TypeCount,
    ValidatedEntity, Verdict, VerdictLists,
};

pub use engine::DetectionEngine;
pub use engines::hybrid_engine::HybridEngine;

pub use extractor::{compile_patterns, extract_candidates, CandidateExtractor, RegexExtractor};
pub use recognizer::{augment, ContextualRecognizer, EntityRecognizer, RecognizedEntity};
pub use scoring::score;
pub use masking::{mask_detection_result, mask_text, mask_value, MaskingOptions, MaskingPolicy};

pub use batch::{normalize_records, BatchOptions, BatchProgress, BatchRunner, BatchSummary, CancellationFlag};
pub use headless::{default_engine, headless_detect, headless_mask};
