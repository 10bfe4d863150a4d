//! Contextual recognition of person names and addresses.
//!
//! The engine talks to recognizers through [`EntityRecognizer`] so the model
//! can be swapped or left out entirely. [`ContextualRecognizer`] adapts the
//! `mascara-context` crate; [`augment`] applies the confidence gate and
//! folds the survivors into a `DetectionResult`.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use mascara_context::{ContextRecognizer, EntityKind};

use crate::config::RecognizerConfig;
use crate::entity::{DetectionResult, PiiType};
use crate::errors::MascaraError;

/// A contextual span with the recognizer's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEntity {
    /// `Nome` or `Endereco`.
    pub pii_type: PiiType,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// A source of contextual entities.
pub trait EntityRecognizer: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Returns every candidate span, unfiltered, in text order.
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, MascaraError>;

    /// Whether `recognize` may run on several threads at once. When `false`
    /// the engine serializes calls behind a lock.
    fn supports_concurrent_use(&self) -> bool {
        true
    }
}

/// Rule-based recognizer backed by `mascara-context`. Immutable and shareable.
#[derive(Debug)]
pub struct ContextualRecognizer {
    inner: ContextRecognizer,
}

impl ContextualRecognizer {
    pub fn new(config: &RecognizerConfig) -> Self {
        Self {
            inner: ContextRecognizer::new(config.cue_window),
        }
    }
}

impl EntityRecognizer for ContextualRecognizer {
    fn name(&self) -> &str {
        "mascara-context"
    }

    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, MascaraError> {
        let entities = self
            .inner
            .scan(text)
            .into_iter()
            .filter_map(|m| {
                let value = text.get(m.start..m.end)?;
                Some(RecognizedEntity {
                    pii_type: match m.kind {
                        EntityKind::Person => PiiType::Nome,
                        EntityKind::Address => PiiType::Endereco,
                    },
                    value: value.to_string(),
                    start: m.start,
                    end: m.end,
                    confidence: m.confidence,
                })
            })
            .collect();
        Ok(entities)
    }
}

/// Drops entities below `min_confidence`, records the rest in `result`
/// (deduplicated, first-seen order) and returns the kept spans.
pub fn augment(
    result: &mut DetectionResult,
    entities: Vec<RecognizedEntity>,
    min_confidence: f64,
) -> Vec<RecognizedEntity> {
    let before = entities.len();
    let kept: Vec<RecognizedEntity> = entities
        .into_iter()
        .filter(|e| e.confidence >= min_confidence && e.pii_type.is_contextual())
        .collect();
    debug!(
        "Recognizer produced {} entities, {} above confidence {}.",
        before,
        kept.len(),
        min_confidence
    );

    for entity in &kept {
        let list = match entity.pii_type {
            PiiType::Nome => &mut result.nome,
            _ => &mut result.endereco,
        };
        if !list.contains(&entity.value) {
            list.push(entity.value.clone());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(pii_type: PiiType, value: &str, start: usize, confidence: f64) -> RecognizedEntity {
        RecognizedEntity {
            pii_type,
            value: value.to_string(),
            start,
            end: start + value.len(),
            confidence,
        }
    }

    #[test]
    fn test_augment_filters_and_dedupes() {
        let mut result = DetectionResult::default();
        let kept = augment(
            &mut result,
            vec![
                entity(PiiType::Nome, "Ana Souza", 0, 0.9),
                entity(PiiType::Nome, "Brasil", 20, 0.3),
                entity(PiiType::Endereco, "Rua Augusta, 10", 30, 0.95),
                entity(PiiType::Nome, "Ana Souza", 50, 0.9),
            ],
            0.6,
        );
        assert_eq!(kept.len(), 3);
        assert_eq!(result.nome, vec!["Ana Souza".to_string()]);
        assert_eq!(result.endereco, vec!["Rua Augusta, 10".to_string()]);
    }

    #[test]
    fn test_contextual_recognizer_maps_kinds() {
        let recognizer = ContextualRecognizer::new(&RecognizerConfig::default());
        let text = "Cliente: Joana Prado, Rua das Acácias, 45";
        let found = recognizer.recognize(text).unwrap();
        assert!(found.iter().any(|e| e.pii_type == PiiType::Nome && e.value == "Joana Prado"));
        assert!(found
            .iter()
            .any(|e| e.pii_type == PiiType::Endereco && e.value == "Rua das Acácias, 45"));
        assert!(recognizer.supports_concurrent_use());
    }
}
