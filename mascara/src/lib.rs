// mascara/src/lib.rs
//! # mascara CLI Application
//!
//! This crate provides the command-line interface for `mascara-core`: batch
//! detection with JSON-lines output, policy-driven masking, and configuration
//! checks.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
