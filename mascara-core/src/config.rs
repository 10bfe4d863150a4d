//! Configuration management for `mascara-core`.
//!
//! This module defines the engine configuration: extraction patterns, risk
//! weights, recognizer thresholds, batch sizing and masking defaults. It handles
//! YAML (de)serialization and provides utilities for discovering, loading,
//! merging and validating configs. Every section is `#[serde(default)]`, so a
//! file only needs to name what it changes.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entity::{PiiType, Verdict};
use crate::errors::MascaraError;
use crate::masking::MaskingPolicy;

/// Maximum allowed length for a pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MASCARA_CONFIG";

/// Replacement used by `PROTECAO_TOTAL`.
pub const DEFAULT_SENTINEL: &str = "[INFORMAÇÃO PROTEGIDA LGPD]";

pub const DEFAULT_CPF_PATTERN: &str = r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b";
pub const DEFAULT_RG_PATTERN: &str = r"\b(?:\d{1,2}\.\d{3}\.\d{3}(?:-?[0-9Xx])?|\d{7,9}(?:-[0-9Xx])?)\b";
pub const DEFAULT_EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*";
pub const DEFAULT_TELEFONE_PATTERN: &str = r"(?:\(\d{2}\)\s?|\b\d{2}[\s-]?|\b)9?\d{4}[\s-]?\d{4}\b";

/// Extraction pattern per pattern-based type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternConfig {
    pub cpf: String,
    pub rg: String,
    pub email: String,
    pub telefone: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            cpf: DEFAULT_CPF_PATTERN.to_string(),
            rg: DEFAULT_RG_PATTERN.to_string(),
            email: DEFAULT_EMAIL_PATTERN.to_string(),
            telefone: DEFAULT_TELEFONE_PATTERN.to_string(),
        }
    }
}

impl PatternConfig {
    /// Pattern for `pii_type`; `None` for contextual types.
    pub fn get(&self, pii_type: PiiType) -> Option<&str> {
        match pii_type {
            PiiType::Cpf => Some(&self.cpf),
            PiiType::Rg => Some(&self.rg),
            PiiType::Email => Some(&self.email),
            PiiType::Telefone => Some(&self.telefone),
            PiiType::Nome | PiiType::Endereco => None,
        }
    }
}

/// Verified/suspect weight pair of a pattern-based type.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TypeWeights {
    pub verified: f64,
    pub suspect: f64,
}

/// Risk score weights and saturation threshold.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weighted sum at which the score saturates to 1.0.
    pub threshold: f64,
    pub cpf: TypeWeights,
    pub rg: TypeWeights,
    pub email: TypeWeights,
    pub telefone: TypeWeights,
    pub nome: f64,
    pub endereco: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            cpf: TypeWeights { verified: 1.0, suspect: 0.6 },
            rg: TypeWeights { verified: 0.9, suspect: 0.5 },
            email: TypeWeights { verified: 0.5, suspect: 0.3 },
            telefone: TypeWeights { verified: 0.5, suspect: 0.3 },
            nome: 0.2,
            endereco: 0.25,
        }
    }
}

impl ScoringConfig {
    fn pair(&self, pii_type: PiiType) -> Option<&TypeWeights> {
        match pii_type {
            PiiType::Cpf => Some(&self.cpf),
            PiiType::Rg => Some(&self.rg),
            PiiType::Email => Some(&self.email),
            PiiType::Telefone => Some(&self.telefone),
            PiiType::Nome | PiiType::Endereco => None,
        }
    }

    /// Weight of one occurrence. Contextual types ignore `verdict`.
    pub fn weight(&self, pii_type: PiiType, verdict: Verdict) -> f64 {
        match (self.pair(pii_type), verdict) {
            (Some(w), Verdict::Verified) => w.verified,
            (Some(w), Verdict::Suspect) => w.suspect,
            (None, _) if pii_type == PiiType::Nome => self.nome,
            (None, _) => self.endereco,
        }
    }
}

/// Contextual recognizer settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub enabled: bool,
    /// Entities below this confidence are dropped. The default admits a
    /// capitalized run only with a cue keyword or at least three words.
    pub min_confidence: f64,
    /// Bytes scanned before a name for cue keywords.
    pub cue_window: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.75,
            cue_window: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    pub chunk_size: usize,
    /// Worker threads; 0 means one per CPU.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { chunk_size: 100, workers: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskingConfig {
    pub sentinel: String,
    pub default_policy: MaskingPolicy,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            default_policy: MaskingPolicy::Parcial,
        }
    }
}

/// Top-level configuration. Read-only once handed to an engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MascaraConfig {
    pub patterns: PatternConfig,
    pub scoring: ScoringConfig,
    pub recognizer: RecognizerConfig,
    pub batch: BatchConfig,
    pub masking: MaskingConfig,
}

impl MascaraConfig {
    /// Loads and validates a config from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::load_from_str(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        info!("Loaded configuration from file {}.", path.display());
        Ok(config)
    }

    /// Parses and validates a config from YAML text.
    pub fn load_from_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map.
        let config: MascaraConfig = if yaml.trim().is_empty() {
            MascaraConfig::default()
        } else {
            serde_yml::from_str(yaml).context("Failed to parse configuration")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective configuration: `MASCARA_CONFIG` if set, otherwise
    /// the first existing candidate path, otherwise built-in defaults.
    pub fn discover() -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            if !explicit.trim().is_empty() {
                debug!("{} set, loading {}", CONFIG_ENV_VAR, explicit);
                let user = Self::load_from_file(&explicit)?;
                return Ok(merge_config(Self::default(), Some(user)));
            }
        }

        for candidate in config_candidate_paths() {
            if candidate.is_file() {
                debug!("Found configuration at: {}", candidate.display());
                let user = Self::load_from_file(&candidate)?;
                return Ok(merge_config(Self::default(), Some(user)));
            }
        }

        debug!("No configuration file found; using built-in defaults.");
        Ok(Self::default())
    }

    /// Checks every constraint at once and reports all violations together.
    pub fn validate(&self) -> Result<(), MascaraError> {
        if self.batch.chunk_size == 0 {
            return Err(MascaraError::InvalidChunkSize(self.batch.chunk_size));
        }

        let mut errors = Vec::new();

        let s = &self.scoring;
        if !(s.threshold.is_finite() && s.threshold > 0.0) {
            errors.push(format!("scoring.threshold must be a positive number, got {}", s.threshold));
        }
        for pii_type in PiiType::REGEX_TYPES {
            let verified = s.weight(pii_type, Verdict::Verified);
            let suspect = s.weight(pii_type, Verdict::Suspect);
            for (label, w) in [("verified", verified), ("suspect", suspect)] {
                if !(w.is_finite() && w > 0.0) {
                    errors.push(format!("scoring.{}.{} must be a positive number, got {}", pii_type, label, w));
                }
            }
            if suspect > verified {
                errors.push(format!(
                    "scoring.{}: suspect weight ({}) exceeds verified weight ({})",
                    pii_type, suspect, verified
                ));
            }
        }
        for (label, w) in [("nome", s.nome), ("endereco", s.endereco)] {
            if !(w.is_finite() && w > 0.0) {
                errors.push(format!("scoring.{} must be a positive number, got {}", label, w));
            }
        }

        let r = &self.recognizer;
        if !(0.0..=1.0).contains(&r.min_confidence) {
            errors.push(format!("recognizer.min_confidence must be within [0, 1], got {}", r.min_confidence));
        }

        let sentinel = self.masking.sentinel.as_str();
        if sentinel.trim().is_empty() {
            errors.push("masking.sentinel must not be empty.".to_string());
        }

        for pii_type in PiiType::REGEX_TYPES {
            let pattern = self.patterns.get(pii_type).unwrap_or_default();
            if pattern.is_empty() {
                errors.push(format!("patterns.{} is empty.", pii_type));
                continue;
            }
            if pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "patterns.{}: length ({}) exceeds maximum allowed ({})",
                    pii_type,
                    pattern.len(),
                    MAX_PATTERN_LENGTH
                ));
                continue;
            }
            match Regex::new(pattern) {
                Ok(re) if !sentinel.is_empty() && re.is_match(sentinel) => {
                    errors.push(format!("patterns.{} matches the masking sentinel.", pii_type));
                }
                Ok(_) => {}
                Err(e) => errors.push(format!("patterns.{} is not a valid pattern: {}", pii_type, e)),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MascaraError::InvalidConfig(errors.join("\n")))
        }
    }
}

/// Places searched by [`MascaraConfig::discover`], in order.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let candidates = vec![
        dirs::home_dir().map(|p| p.join(".mascara").join("config.yaml")),
        dirs::config_dir().map(|p| p.join("mascara").join("config.yaml")),
        Some(PathBuf::from("/etc/mascara/config.yaml")),
        Some(PathBuf::from("./config/mascara.yaml")),
    ];
    candidates.into_iter().flatten().collect()
}

/// Layers `user` over `base`: a user field replaces the base field only when
/// it differs from the built-in default.
pub fn merge_config(base: MascaraConfig, user: Option<MascaraConfig>) -> MascaraConfig {
    let user = match user {
        Some(user) => user,
        None => {
            debug!("merge_config called without user config; keeping base.");
            return base;
        }
    };
    let builtin = MascaraConfig::default();

    fn pick<T: PartialEq>(base: T, user: T, builtin: &T) -> T {
        if user != *builtin {
            user
        } else {
            base
        }
    }

    let merged = MascaraConfig {
        patterns: PatternConfig {
            cpf: pick(base.patterns.cpf, user.patterns.cpf, &builtin.patterns.cpf),
            rg: pick(base.patterns.rg, user.patterns.rg, &builtin.patterns.rg),
            email: pick(base.patterns.email, user.patterns.email, &builtin.patterns.email),
            telefone: pick(base.patterns.telefone, user.patterns.telefone, &builtin.patterns.telefone),
        },
        scoring: ScoringConfig {
            threshold: pick(base.scoring.threshold, user.scoring.threshold, &builtin.scoring.threshold),
            cpf: pick(base.scoring.cpf, user.scoring.cpf, &builtin.scoring.cpf),
            rg: pick(base.scoring.rg, user.scoring.rg, &builtin.scoring.rg),
            email: pick(base.scoring.email, user.scoring.email, &builtin.scoring.email),
            telefone: pick(base.scoring.telefone, user.scoring.telefone, &builtin.scoring.telefone),
            nome: pick(base.scoring.nome, user.scoring.nome, &builtin.scoring.nome),
            endereco: pick(base.scoring.endereco, user.scoring.endereco, &builtin.scoring.endereco),
        },
        recognizer: RecognizerConfig {
            enabled: pick(base.recognizer.enabled, user.recognizer.enabled, &builtin.recognizer.enabled),
            min_confidence: pick(
                base.recognizer.min_confidence,
                user.recognizer.min_confidence,
                &builtin.recognizer.min_confidence,
            ),
            cue_window: pick(base.recognizer.cue_window, user.recognizer.cue_window, &builtin.recognizer.cue_window),
        },
        batch: BatchConfig {
            chunk_size: pick(base.batch.chunk_size, user.batch.chunk_size, &builtin.batch.chunk_size),
            workers: pick(base.batch.workers, user.batch.workers, &builtin.batch.workers),
        },
        masking: MaskingConfig {
            sentinel: pick(base.masking.sentinel, user.masking.sentinel, &builtin.masking.sentinel),
            default_policy: pick(
                base.masking.default_policy,
                user.masking.default_policy,
                &builtin.masking.default_policy,
            ),
        },
    };
    debug!("Merged user configuration over base.");
    merged
}
