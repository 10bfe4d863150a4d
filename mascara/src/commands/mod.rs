//! Command implementations and the record I/O they share.

pub mod detect;
pub mod mask;

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use log::{debug, info};
use tokio::sync::mpsc;

use mascara_core::{BatchOptions, BatchProgress, BatchRunner, MascaraConfig};

use crate::cli::RecordArgs;

/// Reads newline-delimited records from `path`, or from stdin when absent.
/// A trailing newline does not produce an extra empty record.
pub fn read_records(path: Option<&Path>) -> Result<Vec<String>> {
    let text = match path {
        Some(p) => {
            info!("Reading records from file: {}", p.display());
            fs::read_to_string(p).with_context(|| format!("Failed to read input from {}", p.display()))?
        }
        None => {
            info!("Reading records from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            buffer
        }
    };
    Ok(split_records(&text))
}

pub fn split_records(text: &str) -> Vec<String> {
    text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect()
}

/// Opens the output target: the given file, or a locked stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            info!("Writing output to file: {}", p.display());
            let file = fs::File::create(p).with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Batch options from the config, with command-line overrides applied.
pub fn batch_options(config: &MascaraConfig, args: &RecordArgs) -> BatchOptions {
    let mut options = BatchOptions::from(&config.batch);
    if let Some(chunk_size) = args.chunk_size {
        options.chunk_size = chunk_size;
    }
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    options
}

/// Builds a runner whose progress reports are logged from a listener thread.
/// Drop the runner, then join the handle, to end the listener.
pub fn runner_with_progress(options: BatchOptions) -> Result<(BatchRunner, JoinHandle<()>)> {
    let (tx, mut rx) = mpsc::channel::<BatchProgress>(16);
    let runner = BatchRunner::new(options)?.with_progress(tx);
    let listener = std::thread::spawn(move || {
        while let Some(progress) = rx.blocking_recv() {
            info!("Progress: {}/{} records.", progress.processed, progress.total);
        }
        debug!("Progress listener finished.");
    });
    Ok((runner, listener))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_records() {
        assert_eq!(split_records("a\r\nb\n\nc\n"), vec!["a", "b", "", "c"]);
        assert!(split_records("").is_empty());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let args = RecordArgs {
            input_file: None,
            output: None,
            chunk_size: Some(7),
            workers: None,
            no_recognizer: false,
            summary: false,
        };
        let options = batch_options(&MascaraConfig::default(), &args);
        assert_eq!(options.chunk_size, 7);
        assert_eq!(options.workers, 0);
    }
}
