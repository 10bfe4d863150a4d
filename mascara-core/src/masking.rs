//! Masking policies and span-accurate text rewriting.
//!
//! `PARCIAL` keeps the shape of each value and hides the identifying part;
//! `PROTECAO_TOTAL` replaces the whole value with a fixed sentinel. Full-text
//! rewriting collects every accepted span first, then applies the
//! replacements back-to-front so earlier offsets stay valid.
//!
//! License: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SENTINEL;
use crate::entity::{log_masking_debug, DetectedEntity, DetectionResult, PiiType, VerdictLists};
use crate::errors::MascaraError;
use crate::validators::split_phone;

const MASK: char = '*';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskingPolicy {
    /// Format-preserving partial masking.
    #[default]
    #[serde(rename = "PARCIAL", alias = "parcial")]
    Parcial,
    /// Whole value replaced by the sentinel.
    #[serde(rename = "PROTECAO_TOTAL", alias = "protecao_total")]
    ProtecaoTotal,
}

impl fmt::Display for MaskingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskingPolicy::Parcial => f.write_str("PARCIAL"),
            MaskingPolicy::ProtecaoTotal => f.write_str("PROTECAO_TOTAL"),
        }
    }
}

impl FromStr for MaskingPolicy {
    type Err = MascaraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "PARCIAL" => Ok(MaskingPolicy::Parcial),
            "PROTECAO_TOTAL" | "PROTEÇÃO_TOTAL" => Ok(MaskingPolicy::ProtecaoTotal),
            _ => Err(MascaraError::UnknownMaskingPolicy(s.to_string())),
        }
    }
}

/// Policy, type selection and sentinel for one masking call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingOptions {
    pub policy: MaskingPolicy,
    /// Types to mask; `None` masks every type.
    pub types: Option<Vec<PiiType>>,
    pub sentinel: String,
}

impl Default for MaskingOptions {
    fn default() -> Self {
        Self::new(MaskingPolicy::default())
    }
}

impl MaskingOptions {
    pub fn new(policy: MaskingPolicy) -> Self {
        Self {
            policy,
            types: None,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_types<I: IntoIterator<Item = PiiType>>(mut self, types: I) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn includes(&self, pii_type: PiiType) -> bool {
        self.types.as_ref().map_or(true, |types| types.contains(&pii_type))
    }

    /// Parses a type selection: `todos` (or `all`) for every type, otherwise a
    /// comma-separated list such as `cpf,email`.
    pub fn parse_types(selection: &str) -> Result<Option<Vec<PiiType>>, MascaraError> {
        let trimmed = selection.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("todos") || trimmed.eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        let mut types = Vec::new();
        for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let pii_type: PiiType = part.parse()?;
            if !types.contains(&pii_type) {
                types.push(pii_type);
            }
        }
        Ok(Some(types))
    }
}

/// `123.456.789-09` -> `***.456.789-**`
fn mask_cpf(value: &str) -> String {
    let mut digit_index = 0;
    value
        .chars()
        .map(|c| {
            if !c.is_ascii_digit() {
                return c;
            }
            let i = digit_index;
            digit_index += 1;
            if i < 3 || i >= 9 {
                MASK
            } else {
                c
            }
        })
        .collect()
}

/// `12.345.678-X` -> `**.345.678-X`; unpunctuated values lose their first two characters.
fn mask_rg(value: &str) -> String {
    match value.find(|c: char| c == '.' || c == '-') {
        Some(first_sep) => value
            .char_indices()
            .map(|(i, c)| if i < first_sep && c.is_ascii_alphanumeric() { MASK } else { c })
            .collect(),
        None => value
            .chars()
            .enumerate()
            .map(|(i, c)| if i < 2 { MASK } else { c })
            .collect(),
    }
}

/// `teste@teste` -> `te***@teste`. Local parts of one or two characters keep only the first.
fn mask_email(value: &str) -> String {
    let (local, domain) = match value.split_once('@') {
        Some(parts) => parts,
        None => (value, ""),
    };
    let len = local.chars().count();
    let keep = if len <= 2 { 1 } else { 2 };
    let mut masked: String = local
        .chars()
        .enumerate()
        .map(|(i, c)| if i < keep { c } else { MASK })
        .collect();
    if value.contains('@') {
        masked.push('@');
        masked.push_str(domain);
    }
    masked
}

/// `(61) 98765-4321` -> `(61) 9****-4321`; `3333-4444` -> `****-4444`.
fn mask_telefone(value: &str) -> String {
    let (_, local) = split_phone(value);
    let total = value.chars().filter(|c| c.is_ascii_digit()).count();
    let local_len = local.len().min(total);
    let local_start = total - local_len;

    let (mask_from, mask_to) = if local_len <= 4 {
        (local_start, total)
    } else if local_len == 9 {
        // Mobile numbers keep their leading 9.
        (local_start + 1, total - 4)
    } else {
        (local_start, total - 4)
    };

    let mut digit_index = 0;
    value
        .chars()
        .map(|c| {
            if !c.is_ascii_digit() {
                return c;
            }
            let i = digit_index;
            digit_index += 1;
            if (mask_from..mask_to).contains(&i) {
                MASK
            } else {
                c
            }
        })
        .collect()
}

/// `Paulo Henrique` -> `P. H.`
fn mask_nome(value: &str) -> String {
    value
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .map(|initial| format!("{}.", initial))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Rua das Flores, 123` -> `Rua *** ******, ***`: the thoroughfare type stays readable.
fn mask_endereco(value: &str) -> String {
    let mut past_first_token = false;
    value
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                past_first_token = true;
                c
            } else if past_first_token && c.is_alphanumeric() {
                MASK
            } else {
                c
            }
        })
        .collect()
}

/// Masks one isolated value of `pii_type`. Type selection is not consulted.
pub fn mask_value(pii_type: PiiType, value: &str, options: &MaskingOptions) -> String {
    match options.policy {
        MaskingPolicy::ProtecaoTotal => options.sentinel.clone(),
        MaskingPolicy::Parcial => match pii_type {
            PiiType::Cpf => mask_cpf(value),
            PiiType::Rg => mask_rg(value),
            PiiType::Email => mask_email(value),
            PiiType::Telefone => mask_telefone(value),
            PiiType::Nome => mask_nome(value),
            PiiType::Endereco => mask_endereco(value),
        },
    }
}

/// Rewrites `text`, masking every selected span.
///
/// Spans overlapping an existing sentinel are ignored, which makes
/// `PROTECAO_TOTAL` idempotent. Where spans of different types overlap, the
/// one with the better `PiiType::precedence` wins.
pub fn mask_text(text: &str, spans: &[DetectedEntity], options: &MaskingOptions) -> String {
    let sentinel_ranges: Vec<(usize, usize)> = if options.sentinel.is_empty() {
        Vec::new()
    } else {
        text.match_indices(options.sentinel.as_str())
            .map(|(start, s)| (start, start + s.len()))
            .collect()
    };
    let overlaps = |a: (usize, usize), b: (usize, usize)| a.0 < b.1 && b.0 < a.1;

    let mut candidates: Vec<&DetectedEntity> = spans
        .iter()
        .filter(|s| options.includes(s.pii_type))
        .filter(|s| s.start < s.end && text.get(s.start..s.end).is_some())
        .filter(|s| !sentinel_ranges.iter().any(|r| overlaps(*r, (s.start, s.end))))
        .collect();
    candidates.sort_by_key(|s| (s.pii_type.precedence(), s.start));

    let mut accepted: Vec<&DetectedEntity> = Vec::with_capacity(candidates.len());
    for span in candidates {
        if !accepted.iter().any(|a| overlaps((a.start, a.end), (span.start, span.end))) {
            accepted.push(span);
        }
    }
    accepted.sort_by(|a, b| b.start.cmp(&a.start));

    let mut output = text.to_string();
    for span in accepted {
        let original = &text[span.start..span.end];
        let replacement = mask_value(span.pii_type, original, options);
        log_masking_debug("[mascara_core::masking]", span.pii_type, original, &replacement);
        output.replace_range(span.start..span.end, &replacement);
    }
    output
}

fn mask_lists(lists: &VerdictLists, pii_type: PiiType, options: &MaskingOptions) -> VerdictLists {
    if !options.includes(pii_type) {
        return lists.clone();
    }
    VerdictLists {
        verified: lists.verified.iter().map(|v| mask_value(pii_type, v, options)).collect(),
        suspect: lists.suspect.iter().map(|v| mask_value(pii_type, v, options)).collect(),
    }
}

fn mask_list(values: &[String], pii_type: PiiType, options: &MaskingOptions) -> Vec<String> {
    if !options.includes(pii_type) {
        return values.to_vec();
    }
    values.iter().map(|v| mask_value(pii_type, v, options)).collect()
}

/// Same-shaped result whose value lists are masked value by value. Flags,
/// score and warnings are carried over unchanged.
pub fn mask_detection_result(result: &DetectionResult, options: &MaskingOptions) -> DetectionResult {
    DetectionResult {
        has_pii: result.has_pii,
        risk_score: result.risk_score,
        cpf: mask_lists(&result.cpf, PiiType::Cpf, options),
        rg: mask_lists(&result.rg, PiiType::Rg, options),
        email: mask_lists(&result.email, PiiType::Email, options),
        telefone: mask_lists(&result.telefone, PiiType::Telefone, options),
        nome: mask_list(&result.nome, PiiType::Nome, options),
        endereco: mask_list(&result.endereco, PiiType::Endereco, options),
        warnings: result.warnings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Verdict;

    fn parcial(pii_type: PiiType, value: &str) -> String {
        mask_value(pii_type, value, &MaskingOptions::new(MaskingPolicy::Parcial))
    }

    fn span(pii_type: PiiType, text: &str, value: &str) -> DetectedEntity {
        let start = text.find(value).unwrap();
        DetectedEntity {
            pii_type,
            value: value.to_string(),
            start,
            end: start + value.len(),
            verdict: None,
            confidence: None,
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("parcial".parse::<MaskingPolicy>().unwrap(), MaskingPolicy::Parcial);
        assert_eq!("PROTECAO_TOTAL".parse::<MaskingPolicy>().unwrap(), MaskingPolicy::ProtecaoTotal);
        assert_eq!("protecao-total".parse::<MaskingPolicy>().unwrap(), MaskingPolicy::ProtecaoTotal);
        assert!(matches!(
            "TOTAL".parse::<MaskingPolicy>(),
            Err(MascaraError::UnknownMaskingPolicy(_))
        ));
    }

    #[test]
    fn test_partial_cpf() {
        assert_eq!(parcial(PiiType::Cpf, "123.456.789-09"), "***.456.789-**");
        assert_eq!(parcial(PiiType::Cpf, "12345678909"), "***456789**");
    }

    #[test]
    fn test_partial_rg() {
        assert_eq!(parcial(PiiType::Rg, "12.345.678-X"), "**.345.678-X");
        assert_eq!(parcial(PiiType::Rg, "123456789"), "**3456789");
    }

    #[test]
    fn test_partial_email() {
        assert_eq!(parcial(PiiType::Email, "teste@teste"), "te***@teste");
        assert_eq!(parcial(PiiType::Email, "ab@x.com"), "a*@x.com");
    }

    #[test]
    fn test_partial_phone() {
        assert_eq!(parcial(PiiType::Telefone, "(61) 98765-4321"), "(61) 9****-4321");
        assert_eq!(parcial(PiiType::Telefone, "3333-4444"), "****-4444");
        assert_eq!(parcial(PiiType::Telefone, "(11) 3333-4444"), "(11) ****-4444");
    }

    #[test]
    fn test_partial_name_and_address() {
        assert_eq!(parcial(PiiType::Nome, "Paulo Henrique"), "P. H.");
        assert_eq!(parcial(PiiType::Endereco, "Rua das Flores, 123"), "Rua *** ******, ***");
    }

    #[test]
    fn test_partial_preserves_length_and_punctuation() {
        for (pii_type, value) in [
            (PiiType::Cpf, "529.982.247-25"),
            (PiiType::Rg, "1.234.567-8"),
            (PiiType::Telefone, "(21) 2555-0101"),
        ] {
            let masked = parcial(pii_type, value);
            assert_eq!(masked.chars().count(), value.chars().count());
            for (a, b) in value.chars().zip(masked.chars()) {
                if !a.is_ascii_alphanumeric() {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_mask_text_applies_back_to_front() {
        let text = "Meu CPF é 123.456.789-09 e email teste@teste";
        let spans = vec![
            span(PiiType::Cpf, text, "123.456.789-09"),
            span(PiiType::Email, text, "teste@teste"),
        ];
        let masked = mask_text(text, &spans, &MaskingOptions::new(MaskingPolicy::Parcial));
        assert_eq!(masked, "Meu CPF é ***.456.789-** e email te***@teste");
    }

    #[test]
    fn test_precedence_resolves_overlaps() {
        let text = "contato ana@site.com.br";
        let spans = vec![span(PiiType::Nome, text, "ana"), span(PiiType::Email, text, "ana@site.com.br")];
        let masked = mask_text(text, &spans, &MaskingOptions::new(MaskingPolicy::ProtecaoTotal));
        assert_eq!(masked, format!("contato {}", DEFAULT_SENTINEL));
    }

    #[test]
    fn test_total_masking_skips_existing_sentinels() {
        let once = format!("CPF {}", DEFAULT_SENTINEL);
        let start = once.find('[').unwrap() + 1;
        let inner = DetectedEntity {
            pii_type: PiiType::Nome,
            value: "INFORMA".to_string(),
            start,
            end: start + "INFORMA".len(),
            verdict: None,
            confidence: None,
        };
        let masked = mask_text(&once, &[inner], &MaskingOptions::new(MaskingPolicy::ProtecaoTotal));
        assert_eq!(masked, once);
    }

    #[test]
    fn test_type_selection() {
        let text = "cpf 123.456.789-09 mail a@b.com";
        let spans = vec![span(PiiType::Cpf, text, "123.456.789-09"), span(PiiType::Email, text, "a@b.com")];
        let options = MaskingOptions::new(MaskingPolicy::Parcial).with_types([PiiType::Email]);
        assert_eq!(mask_text(text, &spans, &options), "cpf 123.456.789-09 mail a*@b.com");

        assert_eq!(MaskingOptions::parse_types("todos").unwrap(), None);
        assert_eq!(
            MaskingOptions::parse_types("cpf, telefone").unwrap(),
            Some(vec![PiiType::Cpf, PiiType::Telefone])
        );
        assert!(MaskingOptions::parse_types("cnh").is_err());
    }

    #[test]
    fn test_mask_detection_result_keeps_shape() {
        let mut result = DetectionResult::default();
        result.has_pii = true;
        result.risk_score = 0.5;
        result.cpf.push(Verdict::Verified, "123.456.789-09".into());
        result.nome.push("Paulo Henrique".into());

        let masked = mask_detection_result(&result, &MaskingOptions::new(MaskingPolicy::Parcial));
        assert_eq!(masked.cpf.verified, vec!["***.456.789-**".to_string()]);
        assert_eq!(masked.nome, vec!["P. H.".to_string()]);
        assert_eq!(masked.risk_score, 0.5);

        let total = mask_detection_result(&result, &MaskingOptions::new(MaskingPolicy::ProtecaoTotal));
        assert_eq!(total.cpf.verified, vec![DEFAULT_SENTINEL.to_string()]);
    }
}
