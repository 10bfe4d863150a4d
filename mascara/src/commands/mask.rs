//! `mascara mask`: rewrites each record under a masking policy.

use std::io::{self, Write};

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;

use mascara_core::{BatchSummary, DetectionEngine, HybridEngine, MascaraConfig, MaskingOptions, MaskingPolicy};

use crate::cli::MaskCommand;
use crate::commands::{batch_options, open_output, read_records, runner_with_progress};
use crate::ui::output;

/// Resolves the policy and type selection from the command line, falling back
/// to the configured default policy.
pub fn masking_options(engine: &dyn DetectionEngine, cmd: &MaskCommand) -> Result<MaskingOptions> {
    let policy = match &cmd.policy {
        Some(p) => p.parse::<MaskingPolicy>()?,
        None => engine.config().masking.default_policy,
    };
    let mut options = engine.masking_options(policy);
    if let Some(types) = MaskingOptions::parse_types(&cmd.types)? {
        options = options.with_types(types);
    }
    Ok(options)
}

pub fn run_mask(mut config: MascaraConfig, cmd: &MaskCommand, quiet: bool) -> Result<()> {
    let args = &cmd.records;
    if args.no_recognizer {
        config.recognizer.enabled = false;
    }

    let options = batch_options(&config, args);
    let (runner, listener) = runner_with_progress(options)?;
    let engine = HybridEngine::new(config).context("Failed to build detection engine")?;
    let masking = masking_options(&engine, cmd)?;
    info!("Masking with policy {}.", masking.policy);

    let records = read_records(args.input_file.as_deref())?;
    let masked = runner.mask_batch(&engine, &records, &masking);
    // The summary describes what was found in the input, before masking.
    let detected = if args.summary && masked.is_ok() {
        Some(runner.detect_batch(&engine, &records))
    } else {
        None
    };
    drop(runner);
    let _ = listener.join();
    let masked = masked?;

    let mut writer = open_output(args.output.as_deref())?;
    for line in &masked {
        writeln!(writer, "{}", line)?;
    }
    writer.flush().context("Failed to flush output")?;

    if let Some(results) = detected {
        let summary = BatchSummary::from_results(&results?);
        let colors = io::stderr().is_terminal();
        output::print_summary(&mut io::stderr(), &summary, colors)?;
    } else if let Some(path) = &args.output {
        output::info_msg(format!("Wrote {} masked records to {}", masked.len(), path.display()), quiet);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RecordArgs;
    use mascara_core::PiiType;

    fn command(policy: Option<&str>, types: &str) -> MaskCommand {
        MaskCommand {
            records: RecordArgs {
                input_file: None,
                output: None,
                chunk_size: None,
                workers: None,
                no_recognizer: false,
                summary: false,
            },
            policy: policy.map(str::to_string),
            types: types.to_string(),
        }
    }

    #[test]
    fn test_policy_defaults_to_config() {
        let mut config = MascaraConfig::default();
        config.masking.default_policy = MaskingPolicy::ProtecaoTotal;
        let engine = HybridEngine::new(config).unwrap();
        let options = masking_options(&engine, &command(None, "todos")).unwrap();
        assert_eq!(options.policy, MaskingPolicy::ProtecaoTotal);
        assert!(options.types.is_none());
    }

    #[test]
    fn test_explicit_policy_and_types() {
        let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
        let options = masking_options(&engine, &command(Some("protecao-total"), "cpf,email")).unwrap();
        assert_eq!(options.policy, MaskingPolicy::ProtecaoTotal);
        assert_eq!(options.types, Some(vec![PiiType::Cpf, PiiType::Email]));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
        let err = masking_options(&engine, &command(Some("OCULTAR"), "todos")).unwrap_err();
        assert!(err.to_string().contains("Unrecognized masking policy"));
    }
}
