// mascara-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use mascara_core::config::{self, MascaraConfig};
use mascara_core::{MascaraError, MaskingPolicy};

#[test]
fn test_partial_file_keeps_defaults() -> Result<()> {
    let yaml_content = r#"
scoring:
  threshold: 3.5
recognizer:
  min_confidence: 0.8
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;

    let config = MascaraConfig::load_from_file(file.path())?;
    assert_eq!(config.scoring.threshold, 3.5);
    assert_eq!(config.recognizer.min_confidence, 0.8);
    assert_eq!(config.recognizer.cue_window, 32);
    assert_eq!(config.batch.chunk_size, 100);
    assert_eq!(config.masking.sentinel, config::DEFAULT_SENTINEL);
    assert_eq!(config.patterns.cpf, config::DEFAULT_CPF_PATTERN);
    Ok(())
}

#[test]
fn test_policy_and_weights_from_yaml() -> Result<()> {
    let config = MascaraConfig::load_from_str(
        r#"
masking:
  default_policy: PROTECAO_TOTAL
scoring:
  cpf: { verified: 2.0, suspect: 1.0 }
"#,
    )?;
    assert_eq!(config.masking.default_policy, MaskingPolicy::ProtecaoTotal);
    assert_eq!(config.scoring.cpf.verified, 2.0);
    Ok(())
}

#[test]
fn test_empty_document_is_default() -> Result<()> {
    assert_eq!(MascaraConfig::load_from_str("  \n")?, MascaraConfig::default());
    Ok(())
}

#[test]
fn test_invalid_values_fail_loading() {
    let err = MascaraConfig::load_from_str("batch:\n  chunk_size: 0\n").unwrap_err();
    let root = err.downcast_ref::<MascaraError>();
    assert!(matches!(root, Some(MascaraError::InvalidChunkSize(0))));

    let err = MascaraConfig::load_from_str("scoring:\n  threshold: -2\n").unwrap_err();
    assert!(format!("{:#}", err).contains("scoring.threshold"));
}

#[test]
fn test_unknown_policy_in_file_is_a_parse_error() {
    let err = MascaraConfig::load_from_str("masking:\n  default_policy: ESCONDER\n").unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse configuration"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = MascaraConfig::load_from_file("/nonexistent/mascara.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/mascara.yaml"));
}

#[test]
fn test_merge_with_no_user_config() {
    let mut base = MascaraConfig::default();
    base.masking.sentinel = "[LGPD]".to_string();
    let merged = config::merge_config(base.clone(), None);
    assert_eq!(merged, base);
}

#[test]
fn test_candidate_paths_include_system_location() {
    let paths = config::config_candidate_paths();
    assert!(paths.iter().any(|p| p.ends_with("mascara/config.yaml")));
}
