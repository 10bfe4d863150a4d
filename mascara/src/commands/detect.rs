//! `mascara detect`: one JSON detection result per input record.

use std::io::{self, Write};

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use serde::Serialize;

use mascara_core::{BatchSummary, DetectionResult, HybridEngine, MascaraConfig};

use crate::cli::DetectCommand;
use crate::commands::{batch_options, open_output, read_records, runner_with_progress};
use crate::ui::output;

/// A result line: the record's position in the input plus its detection result.
#[derive(Debug, Serialize)]
pub struct DetectionLine<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub result: &'a DetectionResult,
}

pub fn run_detect(mut config: MascaraConfig, cmd: &DetectCommand, quiet: bool) -> Result<()> {
    let args = &cmd.records;
    if args.no_recognizer {
        config.recognizer.enabled = false;
    }

    // Configuration errors are fatal before any record is read.
    let options = batch_options(&config, args);
    let (runner, listener) = runner_with_progress(options)?;
    let engine = HybridEngine::new(config).context("Failed to build detection engine")?;
    if !engine.has_recognizer() {
        info!("Contextual recognizer disabled; names and addresses will not be detected.");
    }

    let records = read_records(args.input_file.as_deref())?;
    let results = runner.detect_batch(&engine, &records);
    drop(runner);
    let _ = listener.join();
    let results = results?;

    // Without a recognizer every record carries a warning; only report real degradation.
    let degraded = results.iter().filter(|r| !r.warnings.is_empty()).count();
    if degraded > 0 && engine.has_recognizer() {
        output::warn_msg(format!("{} registro(s) com detecção degradada; veja o campo \"warnings\".", degraded), quiet);
    }

    let mut writer = open_output(args.output.as_deref())?;
    write_results(&mut writer, &results)?;
    writer.flush().context("Failed to flush output")?;
    debug!("Wrote {} detection results.", results.len());

    if args.summary {
        let summary = BatchSummary::from_results(&results);
        let colors = io::stderr().is_terminal();
        output::print_summary(&mut io::stderr(), &summary, colors)?;
    } else if let Some(path) = &args.output {
        output::info_msg(format!("Wrote {} results to {}", results.len(), path.display()), quiet);
    }
    Ok(())
}

pub fn write_results<W: Write>(writer: &mut W, results: &[DetectionResult]) -> Result<()> {
    for (index, result) in results.iter().enumerate() {
        let line = serde_json::to_string(&DetectionLine { index, result }).context("Failed to serialize result")?;
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mascara_core::DetectionEngine;

    #[test]
    fn test_lines_carry_index_and_flattened_result() {
        let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
        let results = vec![engine.detect("nada"), engine.detect("CPF 529.982.247-25")];

        let mut buf = Vec::new();
        write_results(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["index"], 0);
        assert_eq!(lines[0]["has_pii"], false);
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(lines[1]["cpf"]["verified"][0], "529.982.247-25");
    }
}
