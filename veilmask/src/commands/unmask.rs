//! Unmask command implementation: restore originals on the way back in.
//! License: MIT OR Apache-2.0

use anyhow::Result;
use log::info;

use veilmask_core::MaskEngine;

use crate::cli::UnmaskCommand;
use crate::commands::{read_input, strip_ansi};
use crate::output::{copy_to_clipboard, write_output};

/// Runs the `unmask` subcommand.
///
/// Unmasking is read-only and per-token best-effort: placeholders the store
/// does not know stay in place, and the command still succeeds.
pub fn run(engine: &MaskEngine, args: &UnmaskCommand) -> Result<()> {
    info!("Starting unmask operation.");

    let raw = read_input(args.input_file.as_deref())?;
    let input = strip_ansi(&raw);
    let restored = engine.unmask(&input);

    write_output(&restored, args.output.as_deref())?;
    if args.clipboard {
        copy_to_clipboard(&restored)?;
    }

    info!("Unmask operation completed.");
    Ok(())
}
