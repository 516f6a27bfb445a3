// veilmask/src/logger.rs
//! env_logger wiring for the CLI.
//! License: MIT OR Apache-2.0

use log::LevelFilter;

/// Initializes the global logger.
///
/// An explicit level (from `--quiet` / `--debug`) overrides `RUST_LOG`;
/// without one, `RUST_LOG` applies with a `warn` default. Logging goes to
/// stderr so piped output stays clean.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None);
    // try_init so repeated initialization in tests is harmless.
    let _ = builder.try_init();
}
