// veilmask/src/commands/mod.rs
//! Subcommand implementations.
//! License: MIT OR Apache-2.0

pub mod aliases;
pub mod mask;
pub mod unmask;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Reads the full input from a file, or from stdin when no file was given.
pub(crate) fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Strips ANSI escape sequences so detection sees what the user sees.
pub(crate) fn strip_ansi(text: &str) -> String {
    let stripped = strip_ansi_escapes::strip(text.as_bytes());
    String::from_utf8_lossy(&stripped).into_owned()
}
