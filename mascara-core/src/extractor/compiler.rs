//! compiler.rs - Compiles and caches the extraction patterns.
//!
//! Converts a `PatternConfig` into `CompiledPatterns`. Compilation goes
//! through a process-wide cache keyed by the pattern set, so engines built
//! from the same configuration share one set of automata.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::{PatternConfig, MAX_PATTERN_LENGTH};
use crate::entity::PiiType;
use crate::errors::MascaraError;

/// A compiled pattern bound to the type it extracts.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pii_type: PiiType,
    pub regex: Regex,
}

/// Compiled patterns for every pattern-based type, in `PiiType::REGEX_TYPES` order.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub patterns: Vec<CompiledPattern>,
}

impl CompiledPatterns {
    pub fn get(&self, pii_type: PiiType) -> Option<&CompiledPattern> {
        self.patterns.iter().find(|p| p.pii_type == pii_type)
    }
}

lazy_static! {
    static ref COMPILED_PATTERNS_CACHE: RwLock<HashMap<PatternConfig, Arc<CompiledPatterns>>> =
        RwLock::new(HashMap::new());
}

fn compile_one(pii_type: PiiType, pattern: &str) -> Result<CompiledPattern, MascaraError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(MascaraError::PatternLengthExceeded(pii_type, pattern.len(), MAX_PATTERN_LENGTH));
    }
    let regex = RegexBuilder::new(pattern)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| MascaraError::PatternCompilationError(pii_type, e))?;
    debug!(target: "mascara_core::extractor", "Pattern for '{}' compiled successfully.", pii_type);
    Ok(CompiledPattern { pii_type, regex })
}

/// Compiles every pattern in `config`. All failures are reported together.
pub fn compile_patterns(config: &PatternConfig) -> Result<CompiledPatterns, MascaraError> {
    let mut patterns = Vec::with_capacity(PiiType::REGEX_TYPES.len());
    let mut errors = Vec::new();

    for pii_type in PiiType::REGEX_TYPES {
        let pattern = config.get(pii_type).unwrap_or_default();
        match compile_one(pii_type, pattern) {
            Ok(compiled) => patterns.push(compiled),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => Ok(CompiledPatterns { patterns }),
        1 => Err(errors.remove(0)),
        n => {
            let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
            Err(MascaraError::InvalidConfig(format!("Failed to compile {} pattern(s):\n{}", n, message)))
        }
    }
}

/// Returns cached compiled patterns for `config`, compiling them on first use.
pub fn get_or_compile_patterns(config: &PatternConfig) -> Result<Arc<CompiledPatterns>, MascaraError> {
    {
        let cache = COMPILED_PATTERNS_CACHE.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(compiled) = cache.get(config) {
            debug!("Serving compiled patterns from cache.");
            return Ok(Arc::clone(compiled));
        }
    }

    let compiled = Arc::new(compile_patterns(config)?);
    COMPILED_PATTERNS_CACHE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(config.clone(), Arc::clone(&compiled));
    debug!("Compiled and cached {} patterns.", compiled.patterns.len());
    Ok(compiled)
}
