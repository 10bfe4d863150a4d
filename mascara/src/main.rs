// mascara/src/main.rs
//! mascara entry point.
//!
//! Resolves the configuration, then dispatches to the chosen command.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};

use mascara::cli::{Cli, Commands};
use mascara::commands::{detect, mask};
use mascara::logger;
use mascara_core::{merge_config, MascaraConfig};

fn load_config(cli: &Cli) -> Result<MascaraConfig> {
    match &cli.config {
        Some(path) => {
            let user = MascaraConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration '{}'", path.display()))?;
            Ok(merge_config(MascaraConfig::default(), Some(user)))
        }
        None => MascaraConfig::discover(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);
    debug!("Parsed arguments: {:?}", cli);

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Detect(cmd) => detect::run_detect(config, cmd, cli.quiet),
        Commands::Mask(cmd) => mask::run_mask(config, cmd, cli.quiet),
        Commands::CheckConfig => {
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?);
            Ok(())
        }
    }
}
