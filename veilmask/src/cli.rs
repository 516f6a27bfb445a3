// veilmask/src/cli.rs
//! This file defines the command-line interface (CLI) for the veilmask
//! application, including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "veilmask",
    author = "Veilmask Team",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reversibly de-identify text before sharing it",
    long_about = "Veilmask replaces sensitive spans (names, organizations, emails, card numbers, \
government-ID shapes, and your own blacklisted terms) with stable placeholder tokens before the \
text leaves your machine, and restores the originals when a response comes back. The mapping \
lives in a local alias store; without that store, placeholders are meaningless.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for the 'veilmask' crates to DEBUG)
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to the alias store file. Defaults to the platform data directory.
    #[arg(
        long = "store",
        value_name = "FILE",
        global = true,
        env = "VEILMASK_STORE",
        help = "Path to the alias store file (defaults to the platform data directory)."
    )]
    pub store: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `veilmask` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Masks sensitive spans in an input file or stdin.
    #[command(about = "Masks sensitive spans in an input file or stdin with placeholder tokens.")]
    Mask(MaskCommand),

    /// Restores original text for every placeholder in an input file or stdin.
    #[command(about = "Restores original text for every resolvable placeholder.")]
    Unmask(UnmaskCommand),

    /// Shows what the alias store currently holds.
    #[command(about = "Shows per-category alias counts and, optionally, the stored entries.")]
    Aliases(AliasesCommand),
}

/// Arguments for the `mask` command.
#[derive(Parser, Debug)]
pub struct MaskCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write masked output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Copy masked output to the system clipboard.
    #[arg(long, short = 'c', help = "Copy masked output to the system clipboard.")]
    pub clipboard: bool,

    /// Blacklist terms that must always be redacted (comma-separated).
    #[arg(long, short = 'b', value_delimiter = ',', help = "Literal terms to always redact (comma-separated, case-insensitive, whole-word).")]
    pub blacklist: Vec<String>,

    /// Path to a YAML engine configuration file (blacklist, recognizer bounds).
    #[arg(long = "config", value_name = "FILE", help = "Path to a YAML engine configuration file.")]
    pub config: Option<PathBuf>,

    /// Path to a YAML detection rule file replacing the built-in rules.
    #[arg(long = "rules", value_name = "FILE", help = "Path to a YAML detection rule file replacing the built-in rules.")]
    pub rules: Option<PathBuf>,

    /// Endpoint of an external entity recognizer service.
    #[arg(long = "recognizer-url", value_name = "URL", env = "VEILMASK_RECOGNIZER_URL", help = "Enable the HTTP entity recognizer at this endpoint.")]
    pub recognizer_url: Option<String>,

    /// Suppress the per-category masking summary.
    #[arg(long = "no-summary", help = "Suppress the per-category masking summary.")]
    pub no_summary: bool,

    /// Exit with a non-zero code if anything was masked.
    #[arg(long = "fail-if-masked", help = "Exit with code 2 if at least one span was masked (for pipeline gating).")]
    pub fail_if_masked: bool,
}

/// Arguments for the `unmask` command.
#[derive(Parser, Debug)]
pub struct UnmaskCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write restored output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Copy restored output to the system clipboard.
    #[arg(long, short = 'c', help = "Copy restored output to the system clipboard.")]
    pub clipboard: bool,
}

/// Arguments for the `aliases` command.
#[derive(Parser, Debug)]
pub struct AliasesCommand {
    /// List every stored entry instead of just per-category counts.
    #[arg(long, help = "List every stored entry instead of just per-category counts.")]
    pub full: bool,

    /// Show original texts in the listing instead of fingerprints.
    #[arg(long, requires = "full", help = "Show original texts instead of fingerprints. Prints sensitive data to your terminal.")]
    pub reveal: bool,

    /// Print per-category counts as JSON to stdout.
    #[arg(long, conflicts_with = "full", help = "Print per-category counts as JSON to stdout.")]
    pub json: bool,
}
