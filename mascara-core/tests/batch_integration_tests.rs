// mascara-core/tests/batch_integration_tests.rs
use std::sync::Arc;

use tokio::sync::mpsc;

use mascara_core::extractor::{get_or_compile_patterns, RegexExtractor};
use mascara_core::{
    normalize_records, Analysis, BatchOptions, BatchRunner, BatchSummary, CancellationFlag, Candidate,
    CandidateExtractor, DetectionEngine, DetectionWarning, HybridEngine, MascaraConfig, MascaraError,
    MaskingPolicy, PiiType,
};

const TEMPLATES: &[&str] = &[
    "Cliente Joana Prado, CPF 529.982.247-25, tel (61) 98765-4321",
    "sem dados pessoais",
    "email teste@teste e rg 1234567",
    "Moro na Rua das Flores, 123 e meu e-mail é maria.silva@empresa.com.br",
    "CPF 111.111.111-11",
];

fn records(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("#{} {}", i, TEMPLATES[i % TEMPLATES.len()]))
        .collect()
}

#[test]
fn test_batch_matches_single_record_api() {
    let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
    let input = records(250);
    let runner = BatchRunner::new(BatchOptions { chunk_size: 100, ..Default::default() }).unwrap();

    let batch = runner.detect_batch(&engine, &input).unwrap();
    assert_eq!(batch.len(), 250);
    for (text, result) in input.iter().zip(&batch) {
        assert_eq!(result, &engine.detect(text));
    }

    let options = engine.masking_options(MaskingPolicy::Parcial);
    let masked = runner.mask_batch(&engine, &input, &options).unwrap();
    assert_eq!(masked.len(), 250);
    for (text, out) in input.iter().zip(&masked) {
        assert_eq!(out, &engine.mask_text(text, &options));
    }
}

#[test]
fn test_sequential_and_parallel_agree() {
    let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
    let input = records(57);
    let parallel = BatchRunner::new(BatchOptions { chunk_size: 10, workers: 3, parallel: true }).unwrap();
    let sequential = BatchRunner::new(BatchOptions { chunk_size: 7, workers: 0, parallel: false }).unwrap();
    assert_eq!(
        parallel.detect_batch(&engine, &input).unwrap(),
        sequential.detect_batch(&engine, &input).unwrap()
    );
}

#[test]
fn test_missing_records_become_empty_results() {
    let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
    let input = normalize_records(vec![Some("CPF 529.982.247-25".to_string()), None]);
    let runner = BatchRunner::new(BatchOptions::default()).unwrap();
    let results = runner.detect_batch(&engine, &input).unwrap();
    assert!(results[0].has_pii);
    assert!(!results[1].has_pii);
    assert_eq!(results[1].risk_score, 0.0);
}

#[test]
fn test_progress_reports_per_chunk() {
    let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
    let (tx, mut rx) = mpsc::channel(16);
    let runner = BatchRunner::new(BatchOptions { chunk_size: 100, ..Default::default() })
        .unwrap()
        .with_progress(tx);
    runner.detect_batch(&engine, &records(250)).unwrap();

    let mut seen = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        assert_eq!(progress.total, 250);
        seen.push(progress.processed);
    }
    assert_eq!(seen, vec![100, 200, 250]);
}

/// Engine double that requests cancellation when it sees a given record.
struct CancelAt {
    inner: HybridEngine,
    trigger: String,
    flag: CancellationFlag,
}

impl DetectionEngine for CancelAt {
    fn analyze(&self, text: &str) -> Analysis {
        if text == self.trigger {
            self.flag.cancel();
        }
        self.inner.analyze(text)
    }

    fn config(&self) -> &MascaraConfig {
        self.inner.config()
    }
}

#[test]
fn test_cancellation_stops_at_chunk_boundary() {
    let input = records(250);
    let flag = CancellationFlag::new();
    let engine = CancelAt {
        inner: HybridEngine::new(MascaraConfig::default()).unwrap(),
        trigger: input[150].clone(),
        flag: flag.clone(),
    };
    let runner = BatchRunner::new(BatchOptions { chunk_size: 100, ..Default::default() })
        .unwrap()
        .with_cancellation(flag);

    let err = runner.detect_batch(&engine, &input).unwrap_err();
    assert!(matches!(err, MascaraError::Cancelled { processed: 200, total: 250 }));
}

struct Broken;

impl CandidateExtractor for Broken {
    fn pii_type(&self) -> PiiType {
        PiiType::Email
    }

    fn extract(&self, _text: &str) -> Result<Vec<Candidate>, MascaraError> {
        Err(MascaraError::ExtractionFailed(PiiType::Email, "pattern engine crashed".to_string()))
    }
}

#[test]
fn test_extraction_failure_is_isolated() {
    let config = MascaraConfig::default();
    let compiled = get_or_compile_patterns(&config.patterns).unwrap();
    let mut extractors: Vec<Box<dyn CandidateExtractor>> = compiled
        .patterns
        .iter()
        .filter(|p| p.pii_type != PiiType::Email)
        .map(|p| Box::new(RegexExtractor::from_compiled(p)) as Box<dyn CandidateExtractor>)
        .collect();
    extractors.push(Box::new(Broken));
    let engine = HybridEngine::from_parts(config, extractors, None).unwrap();

    let runner = BatchRunner::new(BatchOptions::default()).unwrap();
    let results = runner
        .detect_batch(&engine, &["CPF 529.982.247-25 email a@b.com".to_string()])
        .unwrap();
    let result = &results[0];
    assert_eq!(result.cpf.verified.len(), 1);
    assert!(result.email.is_empty());
    assert!(result.warnings.contains(&DetectionWarning::RecognizerUnavailable));
    assert!(result
        .warnings
        .iter()
        .any(|w| matches!(w, DetectionWarning::ExtractionFailed { pii_type: PiiType::Email, .. })));
}

#[test]
fn test_recognizer_unavailable_keeps_pattern_types() {
    let mut config = MascaraConfig::default();
    config.recognizer.enabled = false;
    let engine = Arc::new(HybridEngine::new(config).unwrap());
    let runner = BatchRunner::new(BatchOptions::default()).unwrap();
    let results = runner.detect_batch(engine.as_ref(), &records(10)).unwrap();
    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r.nome.is_empty() && r.endereco.is_empty()));
    assert!(results
        .iter()
        .all(|r| r.warnings == vec![DetectionWarning::RecognizerUnavailable]));
    assert_eq!(results[0].cpf.verified, vec!["529.982.247-25".to_string()]);
}

#[test]
fn test_summary_over_a_batch() {
    let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
    let runner = BatchRunner::new(BatchOptions::default()).unwrap();
    let results = runner.detect_batch(&engine, &records(10)).unwrap();
    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.total_records, 10);
    assert_eq!(summary.records_with_pii, 8);
    let cpf = &summary.totals[0];
    assert_eq!((cpf.verified, cpf.suspect), (2, 2));
    assert!(summary.mean_risk_score > 0.0 && summary.mean_risk_score <= 1.0);
}
