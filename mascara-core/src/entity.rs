// mascara-core/src/entity.rs
//! Core data structures for detected PII: types, verdicts, candidates and the
//! fixed-shape per-record `DetectionResult`, plus PII-safe debug logging helpers.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::MascaraError;

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("MASCARA_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// The PII categories handled by the engine.
///
/// The first four are found by pattern and carry a verdict; `Nome` and
/// `Endereco` come from the contextual recognizer and have no deterministic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiType {
    Cpf,
    Rg,
    Email,
    Telefone,
    Nome,
    Endereco,
}

impl PiiType {
    pub const ALL: [PiiType; 6] = [
        PiiType::Cpf,
        PiiType::Rg,
        PiiType::Email,
        PiiType::Telefone,
        PiiType::Nome,
        PiiType::Endereco,
    ];

    pub const REGEX_TYPES: [PiiType; 4] = [PiiType::Cpf, PiiType::Rg, PiiType::Email, PiiType::Telefone];

    pub fn as_str(&self) -> &'static str {
        match self {
            PiiType::Cpf => "cpf",
            PiiType::Rg => "rg",
            PiiType::Email => "email",
            PiiType::Telefone => "telefone",
            PiiType::Nome => "nome",
            PiiType::Endereco => "endereco",
        }
    }

    pub fn is_contextual(&self) -> bool {
        matches!(self, PiiType::Nome | PiiType::Endereco)
    }

    /// Overlap precedence; lower wins. Pattern types always beat contextual ones.
    pub fn precedence(&self) -> u8 {
        match self {
            PiiType::Cpf => 0,
            PiiType::Email => 1,
            PiiType::Telefone => 2,
            PiiType::Rg => 3,
            PiiType::Endereco => 4,
            PiiType::Nome => 5,
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiType {
    type Err = MascaraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpf" => Ok(PiiType::Cpf),
            "rg" => Ok(PiiType::Rg),
            "email" | "e-mail" => Ok(PiiType::Email),
            "telefone" | "phone" => Ok(PiiType::Telefone),
            "nome" | "name" => Ok(PiiType::Nome),
            "endereco" | "endereço" | "address" => Ok(PiiType::Endereco),
            _ => Err(MascaraError::UnknownPiiType(s.to_string())),
        }
    }
}

/// Outcome of deterministic validation for a pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Suspect,
}

/// A pattern match before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pii_type: PiiType,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Candidate {
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// A candidate plus its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntity {
    pub candidate: Candidate,
    pub verdict: Verdict,
}

/// Any detected span, pattern-based or contextual, as consumed by the masker.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEntity {
    pub pii_type: PiiType,
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// `None` for contextual types.
    pub verdict: Option<Verdict>,
    /// Recognizer confidence; `None` for pattern types.
    pub confidence: Option<f64>,
}

impl From<ValidatedEntity> for DetectedEntity {
    fn from(entity: ValidatedEntity) -> Self {
        Self {
            pii_type: entity.candidate.pii_type,
            value: entity.candidate.value,
            start: entity.candidate.start,
            end: entity.candidate.end,
            verdict: Some(entity.verdict),
            confidence: None,
        }
    }
}

/// Verified and suspect values of one pattern type, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictLists {
    pub verified: Vec<String>,
    pub suspect: Vec<String>,
}

impl VerdictLists {
    pub fn push(&mut self, verdict: Verdict, value: String) {
        match verdict {
            Verdict::Verified => self.verified.push(value),
            Verdict::Suspect => self.suspect.push(value),
        }
    }

    pub fn len(&self) -> usize {
        self.verified.len() + self.suspect.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_empty() && self.suspect.is_empty()
    }
}

/// Non-fatal conditions met while analysing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionWarning {
    /// No recognizer is loaded; `nome` and `endereco` are empty by construction.
    RecognizerUnavailable,
    RecognizerFailed { message: String },
    ExtractionFailed { pii_type: PiiType, message: String },
}

impl fmt::Display for DetectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionWarning::RecognizerUnavailable => {
                write!(f, "entity recognizer unavailable; nome/endereco not detected")
            }
            DetectionWarning::RecognizerFailed { message } => write!(f, "entity recognizer failed: {}", message),
            DetectionWarning::ExtractionFailed { pii_type, message } => {
                write!(f, "extraction failed for {}: {}", pii_type, message)
            }
        }
    }
}

/// Per-record detection outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub has_pii: bool,
    pub risk_score: f64,
    pub cpf: VerdictLists,
    pub rg: VerdictLists,
    pub email: VerdictLists,
    pub telefone: VerdictLists,
    /// Deduplicated person names.
    pub nome: Vec<String>,
    /// Deduplicated addresses.
    pub endereco: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DetectionWarning>,
}

/// Flat per-type counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub pii_type: PiiType,
    pub verified: usize,
    pub suspect: usize,
    pub total: usize,
}

impl DetectionResult {
    pub fn verdict_lists(&self, pii_type: PiiType) -> Option<&VerdictLists> {
        match pii_type {
            PiiType::Cpf => Some(&self.cpf),
            PiiType::Rg => Some(&self.rg),
            PiiType::Email => Some(&self.email),
            PiiType::Telefone => Some(&self.telefone),
            PiiType::Nome | PiiType::Endereco => None,
        }
    }

    pub fn verdict_lists_mut(&mut self, pii_type: PiiType) -> Option<&mut VerdictLists> {
        match pii_type {
            PiiType::Cpf => Some(&mut self.cpf),
            PiiType::Rg => Some(&mut self.rg),
            PiiType::Email => Some(&mut self.email),
            PiiType::Telefone => Some(&mut self.telefone),
            PiiType::Nome | PiiType::Endereco => None,
        }
    }

    pub fn contextual(&self, pii_type: PiiType) -> Option<&Vec<String>> {
        match pii_type {
            PiiType::Nome => Some(&self.nome),
            PiiType::Endereco => Some(&self.endereco),
            _ => None,
        }
    }

    /// Number of values recorded for `pii_type`.
    pub fn count(&self, pii_type: PiiType) -> usize {
        match self.verdict_lists(pii_type) {
            Some(lists) => lists.len(),
            None => self.contextual(pii_type).map_or(0, Vec::len),
        }
    }

    /// Verified/suspect/total counters for every type, in `PiiType::ALL` order.
    /// Contextual types report everything under `total`.
    pub fn counts(&self) -> Vec<TypeCount> {
        PiiType::ALL
            .iter()
            .map(|&pii_type| match self.verdict_lists(pii_type) {
                Some(lists) => TypeCount {
                    pii_type,
                    verified: lists.verified.len(),
                    suspect: lists.suspect.len(),
                    total: lists.len(),
                },
                None => TypeCount {
                    pii_type,
                    verified: 0,
                    suspect: 0,
                    total: self.count(pii_type),
                },
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        PiiType::ALL.iter().all(|t| self.count(*t) == 0)
    }
}

/// The full output of analysing one record: the public result plus every span
/// needed to rewrite the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub result: DetectionResult,
    /// All occurrences in text order, contextual duplicates included.
    pub entities: Vec<DetectedEntity>,
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_candidate_debug(module_path: &str, candidate: &Candidate) {
    debug!(
        "{} Captured {} candidate at {}..{}: '{}'",
        module_path,
        candidate.pii_type,
        candidate.start,
        candidate.end,
        get_loggable_content(&candidate.value)
    );
}

pub fn log_verdict_debug(module_path: &str, entity: &ValidatedEntity) {
    debug!(
        "{} {} candidate '{}' classified as {:?}",
        module_path,
        entity.candidate.pii_type,
        get_loggable_content(&entity.candidate.value),
        entity.verdict
    );
}

pub fn log_masking_debug(module_path: &str, pii_type: PiiType, original: &str, masked: &str) {
    debug!(
        "{} Masking action: Original='{}', Masked='{}' for type '{}'",
        module_path,
        get_loggable_content(original),
        masked,
        pii_type
    );
}
