// mascara-core/src/engines/hybrid_engine.rs
//! A `DetectionEngine` combining pattern extraction, deterministic validation
//! and contextual recognition.
//!
//! Pipeline per record: extract candidates per type, classify each one,
//! run the recognizer over the text, gate and deduplicate its entities, then
//! score. Regex and checksum stages are lock-free; a recognizer that cannot be
//! used concurrently is serialized behind a mutex.
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::config::MascaraConfig;
use crate::engine::DetectionEngine;
use crate::entity::{log_verdict_debug, Analysis, DetectedEntity, DetectionResult, DetectionWarning};
use crate::errors::MascaraError;
use crate::extractor::{extract_candidates, get_or_compile_patterns, regex_extractors, CandidateExtractor};
use crate::recognizer::{augment, ContextualRecognizer, EntityRecognizer, RecognizedEntity};
use crate::scoring::score;
use crate::validators;

pub struct HybridEngine {
    config: MascaraConfig,
    extractors: Vec<Box<dyn CandidateExtractor>>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    /// Present only when the recognizer is not safe for concurrent use.
    recognizer_gate: Option<Mutex<()>>,
}

impl fmt::Debug for HybridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridEngine")
            .field("extractors", &self.extractors.iter().map(|e| e.pii_type()).collect::<Vec<_>>())
            .field("recognizer", &self.recognizer.as_ref().map(|r| r.name().to_string()))
            .field("serialized", &self.recognizer_gate.is_some())
            .finish()
    }
}

impl HybridEngine {
    /// Builds the default pipeline: compiled patterns from `config` and, when
    /// enabled, the contextual recognizer.
    pub fn new(config: MascaraConfig) -> Result<Self, MascaraError> {
        config.validate()?;
        let compiled = get_or_compile_patterns(&config.patterns)?;
        let extractors = regex_extractors(&compiled);
        let recognizer: Option<Arc<dyn EntityRecognizer>> = if config.recognizer.enabled {
            Some(Arc::new(ContextualRecognizer::new(&config.recognizer)))
        } else {
            None
        };
        Self::from_parts(config, extractors, recognizer)
    }

    /// Assembles an engine from explicit stages, e.g. test doubles.
    pub fn from_parts(
        config: MascaraConfig,
        extractors: Vec<Box<dyn CandidateExtractor>>,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
    ) -> Result<Self, MascaraError> {
        config.validate()?;

        let recognizer_gate = match &recognizer {
            Some(r) if !r.supports_concurrent_use() => {
                debug!("Recognizer '{}' is not concurrency-safe; serializing access.", r.name());
                Some(Mutex::new(()))
            }
            Some(_) => None,
            None => {
                warn!("No entity recognizer loaded; nome and endereco will not be detected.");
                None
            }
        };

        debug!("HybridEngine ready with {} extractors.", extractors.len());
        Ok(Self {
            config,
            extractors,
            recognizer,
            recognizer_gate,
        })
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    fn recognize(&self, recognizer: &dyn EntityRecognizer, text: &str) -> Result<Vec<RecognizedEntity>, MascaraError> {
        match &self.recognizer_gate {
            Some(gate) => {
                let _guard = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                recognizer.recognize(text)
            }
            None => recognizer.recognize(text),
        }
    }
}

impl DetectionEngine for HybridEngine {
    fn analyze(&self, text: &str) -> Analysis {
        let mut result = DetectionResult::default();
        let mut entities: Vec<DetectedEntity> = Vec::new();

        let (candidates, mut warnings) = extract_candidates(text, &self.extractors);

        for candidate in candidates {
            let validated = validators::validate(candidate);
            log_verdict_debug("[mascara_core::engines::hybrid_engine]", &validated);
            if let Some(lists) = result.verdict_lists_mut(validated.candidate.pii_type) {
                lists.push(validated.verdict, validated.candidate.value.clone());
            }
            entities.push(DetectedEntity::from(validated));
        }

        match &self.recognizer {
            None => warnings.push(DetectionWarning::RecognizerUnavailable),
            Some(recognizer) => match self.recognize(recognizer.as_ref(), text) {
                Ok(found) => {
                    // A span already claimed by a pattern type stays with it.
                    let found: Vec<RecognizedEntity> = found
                        .into_iter()
                        .filter(|r| !entities.iter().any(|e| e.start < r.end && r.start < e.end))
                        .collect();
                    let kept = augment(&mut result, found, self.config.recognizer.min_confidence);
                    entities.extend(kept.into_iter().map(|r| DetectedEntity {
                        pii_type: r.pii_type,
                        value: r.value,
                        start: r.start,
                        end: r.end,
                        verdict: None,
                        confidence: Some(r.confidence),
                    }));
                }
                Err(e) => {
                    warn!("Recognizer '{}' failed; continuing with pattern types only: {}", recognizer.name(), e);
                    warnings.push(DetectionWarning::RecognizerFailed { message: e.to_string() });
                }
            },
        }

        result.warnings = warnings;
        score(&mut result, &self.config.scoring);
        entities.sort_by_key(|e| e.start);

        debug!(
            "Analyzed record: has_pii={}, risk_score={:.3}, spans={}",
            result.has_pii,
            result.risk_score,
            entities.len()
        );
        Analysis { result, entities }
    }

    fn config(&self) -> &MascaraConfig {
        &self.config
    }
}
