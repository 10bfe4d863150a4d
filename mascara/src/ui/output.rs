//! Human-facing output on stderr: status messages and the batch summary table.
//!
//! Color is applied only when the target is a terminal.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use mascara_core::BatchSummary;

/// Writes an informational line, dimmed blue when color is enabled.
pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, enable_colors: bool) -> Result<()> {
    if enable_colors {
        writeln!(writer, "{}", msg.blue())?;
    } else {
        writeln!(writer, "{}", msg)?;
    }
    Ok(())
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, enable_colors: bool) -> Result<()> {
    if enable_colors {
        writeln!(writer, "{} {}", "Aviso:".yellow().bold(), msg)?;
    } else {
        writeln!(writer, "Aviso: {}", msg)?;
    }
    Ok(())
}

/// Prints an info message to stderr unless `quiet` is set.
pub fn info_msg(msg: impl AsRef<str>, quiet: bool) {
    if quiet {
        return;
    }
    let colors = io::stderr().is_terminal();
    let _ = print_info_message(&mut io::stderr(), msg.as_ref(), colors);
}

pub fn warn_msg(msg: impl AsRef<str>, quiet: bool) {
    if quiet {
        return;
    }
    let colors = io::stderr().is_terminal();
    let _ = print_warn_message(&mut io::stderr(), msg.as_ref(), colors);
}

/// Builds the per-type summary table.
pub fn summary_table(summary: &BatchSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tipo", "Verificados", "Suspeitos", "Total"]);
    for count in &summary.totals {
        table.add_row(vec![
            Cell::new(count.pii_type.as_str()),
            Cell::new(count.verified),
            Cell::new(count.suspect),
            Cell::new(count.total),
        ]);
    }
    table
}

/// Writes the summary block: record counts, mean risk and the type table.
pub fn print_summary<W: Write>(writer: &mut W, summary: &BatchSummary, enable_colors: bool) -> Result<()> {
    let heading = format!(
        "Registros: {} | com dados pessoais: {} | risco médio: {:.3} | com avisos: {}",
        summary.total_records, summary.records_with_pii, summary.mean_risk_score, summary.records_with_warnings
    );
    if enable_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{}", heading)?;
    }
    writeln!(writer, "{}", summary_table(summary))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mascara_core::{DetectionEngine, HybridEngine, MascaraConfig};

    #[test]
    fn test_summary_without_colors() {
        let engine = HybridEngine::new(MascaraConfig::default()).unwrap();
        let results = vec![engine.detect("CPF 529.982.247-25"), engine.detect("nada aqui")];
        let summary = BatchSummary::from_results(&results);

        let mut buf = Vec::new();
        print_summary(&mut buf, &summary, false).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("Registros: 2 | com dados pessoais: 1"));
        assert!(out.contains("cpf"));
        assert!(out.contains("endereco"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_warn_prefix() {
        let mut buf = Vec::new();
        print_warn_message(&mut buf, "sem reconhecedor", false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Aviso: sem reconhecedor\n");
    }
}
