// mascara-core/tests/masking_properties.rs
use mascara_core::{
    mask_detection_result, DetectionEngine, HybridEngine, MascaraConfig, MaskingOptions, MaskingPolicy, PiiType,
    DEFAULT_SENTINEL,
};

const SAMPLES: &[&str] = &[
    "Meu CPF é 123.456.789-09 e email teste@teste",
    "Paciente: Maria Aparecida Souza, RG 12.345.678-X, tel (61) 98765-4321.",
    "Entrega na Av. Paulista nº 1000 para o Sr. Carlos Eduardo Nunes.",
    "Contatos: ana@clinica.com.br, bruno@clinica.com.br; fixo 3333-4444.",
    "sem dados pessoais aqui",
    "",
];

fn engine() -> HybridEngine {
    HybridEngine::new(MascaraConfig::default()).unwrap()
}

#[test]
fn test_total_protection_is_idempotent() {
    let engine = engine();
    let options = engine.masking_options(MaskingPolicy::ProtecaoTotal);
    for text in SAMPLES {
        let once = engine.mask_text(text, &options);
        let twice = engine.mask_text(&once, &options);
        assert_eq!(once, twice, "{}", text);
    }
}

#[test]
fn test_total_protection_leaves_no_pii() {
    let engine = engine();
    let options = engine.masking_options(MaskingPolicy::ProtecaoTotal);
    for text in SAMPLES {
        let masked = engine.mask_text(text, &options);
        let after = engine.detect(&masked);
        assert!(!after.has_pii, "{} -> {}", text, masked);
    }
}

#[test]
fn test_total_protection_of_the_reference_record() {
    let engine = engine();
    let options = engine.masking_options(MaskingPolicy::ProtecaoTotal);
    let masked = engine.mask_text("Meu CPF é 123.456.789-09 e email teste@teste", &options);
    assert_eq!(masked, format!("Meu CPF é {} e email {}", DEFAULT_SENTINEL, DEFAULT_SENTINEL));
}

#[test]
fn test_partial_masking_of_mixed_record() {
    let engine = engine();
    let options = engine.masking_options(MaskingPolicy::Parcial);
    let masked = engine.mask_text(
        "Paciente: Maria Aparecida Souza, RG 12.345.678-X, tel (61) 98765-4321.",
        &options,
    );
    assert_eq!(masked, "Paciente: M. A. S., RG **.345.678-X, tel (61) 9****-4321.");
}

#[test]
fn test_partial_keeps_template_for_structured_types() {
    let engine = engine();
    for (pii_type, value) in [
        (PiiType::Cpf, "123.456.789-09"),
        (PiiType::Cpf, "52998224725"),
        (PiiType::Rg, "12.345.678-X"),
        (PiiType::Rg, "1.234.567"),
        (PiiType::Telefone, "(61) 98765-4321"),
        (PiiType::Telefone, "3333-4444"),
    ] {
        let masked = engine.mask_value(pii_type, value, MaskingPolicy::Parcial);
        assert_eq!(masked.len(), value.len(), "{}", value);
        for (original, replaced) in value.chars().zip(masked.chars()) {
            if original.is_ascii_punctuation() || original.is_whitespace() {
                assert_eq!(original, replaced, "{}", value);
            }
        }
        assert_ne!(masked, value);
    }
}

#[test]
fn test_isolated_value_under_total_protection() {
    let engine = engine();
    assert_eq!(
        engine.mask_value(PiiType::Email, "a@b.com", MaskingPolicy::ProtecaoTotal),
        DEFAULT_SENTINEL
    );
}

#[test]
fn test_custom_sentinel_is_used() {
    let mut config = MascaraConfig::default();
    config.masking.sentinel = "[LGPD]".to_string();
    let engine = HybridEngine::new(config).unwrap();
    let options = engine.masking_options(MaskingPolicy::ProtecaoTotal);
    assert_eq!(engine.mask_text("cpf 529.982.247-25", &options), "cpf [LGPD]");
}

#[test]
fn test_type_scoped_masking() {
    let engine = engine();
    let options = engine
        .masking_options(MaskingPolicy::ProtecaoTotal)
        .with_types([PiiType::Telefone]);
    let masked = engine.mask_text("cpf 529.982.247-25 tel 3333-4444", &options);
    assert_eq!(masked, format!("cpf 529.982.247-25 tel {}", DEFAULT_SENTINEL));
}

#[test]
fn test_masking_a_detection_result() {
    let engine = engine();
    let result = engine.detect("Meu CPF é 123.456.789-09 e email teste@teste");
    let masked = mask_detection_result(&result, &MaskingOptions::new(MaskingPolicy::Parcial));
    assert_eq!(masked.cpf.verified, vec!["***.456.789-**".to_string()]);
    assert_eq!(masked.email.suspect, vec!["te***@teste".to_string()]);
    assert_eq!(masked.risk_score, result.risk_score);
}

#[test]
fn test_rg_check_digit_does_not_survive_masking() {
    let engine = engine();
    let text = "RG 12345678-9 e CPF 529.982.247-25";

    let total = engine.mask_text(text, &engine.masking_options(MaskingPolicy::ProtecaoTotal));
    assert_eq!(total, format!("RG {} e CPF {}", DEFAULT_SENTINEL, DEFAULT_SENTINEL));

    let partial = engine.mask_text(text, &engine.masking_options(MaskingPolicy::Parcial));
    assert_eq!(partial, "RG ********-9 e CPF ***.982.247-**");
}
