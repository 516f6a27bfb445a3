// veilmask/src/output.rs
//! Terminal output helpers: colored stderr messages, the masking summary
//! table, and clipboard hand-off.
//! License: MIT OR Apache-2.0

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use veilmask_core::MaskSummaryItem;

/// Prints an informational message to stderr, colored when attached to a tty.
pub fn info_msg(msg: impl AsRef<str>) {
    if io::stderr().is_terminal() {
        eprintln!("{}", msg.as_ref().green());
    } else {
        eprintln!("{}", msg.as_ref());
    }
}

/// Prints a warning message to stderr, colored when attached to a tty.
pub fn warn_msg(msg: impl AsRef<str>) {
    if io::stderr().is_terminal() {
        eprintln!("{}", msg.as_ref().yellow());
    } else {
        eprintln!("{}", msg.as_ref());
    }
}

/// Writes the primary output to a file or stdout.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info_msg(format!("Wrote output to {}", path.display()));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Renders the per-category masking summary to stderr.
pub fn print_mask_summary(summary: &[MaskSummaryItem]) {
    if summary.is_empty() {
        info_msg("Nothing to mask.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Category", "Spans", "Placeholders"]);
    for item in summary {
        let mut aliases = item.aliases.clone();
        aliases.dedup();
        table.add_row(vec![
            Cell::new(item.category),
            Cell::new(item.occurrences),
            Cell::new(aliases.join(" ")),
        ]);
    }
    eprintln!("{table}");
}

/// Copies `content` to the system clipboard.
#[cfg(feature = "clipboard")]
pub fn copy_to_clipboard(content: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access the clipboard")?;
    clipboard
        .set_text(content.to_string())
        .context("Failed to write to the clipboard")?;
    info_msg("Copied output to clipboard.");
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
pub fn copy_to_clipboard(_content: &str) -> Result<()> {
    anyhow::bail!("veilmask was built without the 'clipboard' feature")
}
