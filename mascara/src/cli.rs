//! This file defines the command-line interface (CLI) for the mascara application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "mascara",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Detect, score and mask Brazilian personal data in text records",
    long_about = "mascara reads newline-delimited text records from a file or stdin and finds Brazilian personal data in each one: CPF (with check-digit validation), RG, e-mail, telefone, person names and street addresses. It reports a per-record risk score or rewrites the records under an LGPD masking policy (PARCIAL or PROTECAO_TOTAL).",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a YAML configuration file.
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        env = "MASCARA_CONFIG",
        help = "Path to a YAML configuration file (defaults to the standard search locations)."
    )]
    pub config: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `mascara` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyzes every record and prints one JSON detection result per line.
    #[command(about = "Analyze records and print one JSON detection result per line.")]
    Detect(DetectCommand),

    /// Rewrites every record under a masking policy.
    #[command(about = "Mask personal data in records under PARCIAL or PROTECAO_TOTAL.")]
    Mask(MaskCommand),

    /// Loads and validates the effective configuration, then prints it as JSON.
    #[command(name = "check-config", about = "Validate the effective configuration and print it.")]
    CheckConfig,
}

/// Input, output and batching options shared by the record-processing commands.
#[derive(Parser, Debug, Clone)]
pub struct RecordArgs {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read records from a file instead of stdin, one per line.")]
    pub input_file: Option<PathBuf>,

    /// Write output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Records per chunk.
    #[arg(long = "chunk-size", value_name = "N", help = "Number of records per processing chunk (overrides the config).")]
    pub chunk_size: Option<usize>,

    /// Worker threads.
    #[arg(long = "workers", value_name = "N", help = "Worker threads per chunk; 0 uses one per CPU (overrides the config).")]
    pub workers: Option<usize>,

    /// Skip name and address recognition.
    #[arg(long = "no-recognizer", help = "Disable contextual recognition of names and addresses.")]
    pub no_recognizer: bool,

    /// Print an aggregate summary to stderr when done.
    #[arg(long = "summary", help = "Print a per-type summary table to stderr when done.")]
    pub summary: bool,
}

/// Arguments for the `detect` command.
#[derive(Parser, Debug)]
pub struct DetectCommand {
    #[command(flatten)]
    pub records: RecordArgs,
}

/// Arguments for the `mask` command.
#[derive(Parser, Debug)]
pub struct MaskCommand {
    #[command(flatten)]
    pub records: RecordArgs,

    /// Masking policy (defaults to the configured policy).
    #[arg(long, short = 'p', value_name = "POLICY", help = "Masking policy: PARCIAL or PROTECAO_TOTAL.")]
    pub policy: Option<String>,

    /// Types to mask.
    #[arg(
        long,
        short = 't',
        value_name = "TYPES",
        default_value = "todos",
        help = "Comma-separated types to mask (cpf, rg, email, telefone, nome, endereco) or 'todos'."
    )]
    pub types: String,
}
