//! Mask command implementation: de-identify text on its way out.
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info};

use veilmask_core::MaskEngine;

use crate::cli::MaskCommand;
use crate::commands::{read_input, strip_ansi};
use crate::output::{copy_to_clipboard, print_mask_summary, warn_msg, write_output};

/// Runs the `mask` subcommand. Returns whether anything was masked so the
/// caller can honor `--fail-if-masked`.
pub fn run(mut engine: MaskEngine, args: &MaskCommand) -> Result<bool> {
    info!("Starting mask operation.");

    let raw = read_input(args.input_file.as_deref())?;
    let input = strip_ansi(&raw);

    let blacklist: Vec<String> = args
        .blacklist
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let outcome = engine.mask(&input, &blacklist).context("Masking failed")?;
    debug!(
        "Content masked. Original length: {}, masked length: {}.",
        input.len(),
        outcome.text.len()
    );

    if outcome.degraded {
        warn_msg("Entity recognizer was unavailable; masked with static rules only.");
    }

    write_output(&outcome.text, args.output.as_deref())?;
    if args.clipboard {
        copy_to_clipboard(&outcome.text)?;
    }
    if !args.no_summary {
        print_mask_summary(&outcome.summary);
    }

    info!("Mask operation completed.");
    Ok(outcome.was_masked)
}
