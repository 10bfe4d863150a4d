#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod scanner;
pub mod context;
pub mod scoring;
pub mod engine;

pub use engine::{ContextRecognizer, EntityKind, EntityMatch};

/// Common type definitions
pub type Confidence = f64;
