// File: mascara-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot, non-interactive use.
//!
//! The default engine is built once per process behind a single-initialization
//! gate and shared read-only afterwards. Construction failures are cached too,
//! so every caller sees the same outcome, with the same error variant.

use std::sync::Arc;

use anyhow::anyhow;
use log::info;
use once_cell::sync::OnceCell;

use crate::config::MascaraConfig;
use crate::engine::DetectionEngine;
use crate::engines::hybrid_engine::HybridEngine;
use crate::entity::DetectionResult;
use crate::errors::MascaraError;
use crate::masking::MaskingPolicy;

static DEFAULT_ENGINE: OnceCell<Result<Arc<HybridEngine>, MascaraError>> = OnceCell::new();

fn build_default_engine() -> Result<Arc<HybridEngine>, MascaraError> {
    info!("Initializing default detection engine.");
    let config = MascaraConfig::discover().map_err(MascaraError::AnyhowWrapper)?;
    Ok(Arc::new(HybridEngine::new(config)?))
}

/// Re-issues a cached error. Variants whose payload cannot be cloned keep
/// their full message.
fn replay(error: &MascaraError) -> MascaraError {
    match error {
        MascaraError::PatternCompilationError(t, e) => MascaraError::PatternCompilationError(*t, e.clone()),
        MascaraError::PatternLengthExceeded(t, len, max) => MascaraError::PatternLengthExceeded(*t, *len, *max),
        MascaraError::InvalidChunkSize(n) => MascaraError::InvalidChunkSize(*n),
        MascaraError::UnknownMaskingPolicy(p) => MascaraError::UnknownMaskingPolicy(p.clone()),
        MascaraError::UnknownPiiType(t) => MascaraError::UnknownPiiType(t.clone()),
        MascaraError::InvalidConfig(m) => MascaraError::InvalidConfig(m.clone()),
        MascaraError::ExtractionFailed(t, m) => MascaraError::ExtractionFailed(*t, m.clone()),
        MascaraError::RecognizerFailed(m) => MascaraError::RecognizerFailed(m.clone()),
        MascaraError::Cancelled { processed, total } => MascaraError::Cancelled {
            processed: *processed,
            total: *total,
        },
        MascaraError::IoError(e) => MascaraError::IoError(std::io::Error::new(e.kind(), e.to_string())),
        MascaraError::AnyhowWrapper(e) => MascaraError::AnyhowWrapper(anyhow!("{:#}", e)),
    }
}

/// The process-wide engine built from `MascaraConfig::discover()`.
pub fn default_engine() -> Result<Arc<HybridEngine>, MascaraError> {
    match DEFAULT_ENGINE.get_or_init(build_default_engine) {
        Ok(engine) => Ok(Arc::clone(engine)),
        Err(error) => Err(replay(error)),
    }
}

/// Detects PII in `text` with the default engine.
pub fn headless_detect(text: &str) -> Result<DetectionResult, MascaraError> {
    Ok(default_engine()?.detect(text))
}

/// Masks `text` with the default engine. `policy` is parsed as `PARCIAL` or
/// `PROTECAO_TOTAL` before any work is done.
pub fn headless_mask(text: &str, policy: &str) -> Result<String, MascaraError> {
    let policy: MaskingPolicy = policy.parse()?;
    let engine = default_engine()?;
    let options = engine.masking_options(policy);
    Ok(engine.mask_text(text, &options))
}
