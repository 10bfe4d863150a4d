//! errors.rs - Custom error types for the mascara-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Configuration errors surface before any record is processed; nothing in
//! the per-record pipeline is allowed to fail a whole batch.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

use crate::entity::PiiType;

/// This enum represents all possible error types in the `mascara-core` library.
///
/// `#[non_exhaustive]` lets new variants land without breaking downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MascaraError {
    #[error("Failed to compile pattern for '{0}': {1}")]
    PatternCompilationError(PiiType, regex::Error),

    #[error("Pattern for '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(PiiType, usize, usize),

    #[error("Chunk size must be a positive integer, got {0}")]
    InvalidChunkSize(usize),

    #[error("Unrecognized masking policy '{0}' (expected PARCIAL or PROTECAO_TOTAL)")]
    UnknownMaskingPolicy(String),

    #[error("Unrecognized PII type '{0}'")]
    UnknownPiiType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Extraction failed for '{0}': {1}")]
    ExtractionFailed(PiiType, String),

    #[error("Entity recognizer failed: {0}")]
    RecognizerFailed(String),

    #[error("Batch cancelled after {processed} of {total} records")]
    Cancelled { processed: usize, total: usize },

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
