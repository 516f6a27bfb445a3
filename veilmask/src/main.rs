// veilmask/src/main.rs
//! Veilmask entry point.
//!
//! Opens the alias store, builds the masking engine, and dispatches to the
//! selected subcommand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use veilmask::cli::{Cli, Commands};
use veilmask::{commands, logger, output};
use veilmask_core::{
    AliasStore, EngineConfig, HttpRecognizer, JsonFileBackend, MaskEngine, RuleConfig,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        Some(LevelFilter::Debug)
    } else if cli.quiet {
        Some(LevelFilter::Off)
    } else {
        None
    };
    logger::init_logger(level);

    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None => default_store_path()?,
    };
    let store = AliasStore::open(Box::new(JsonFileBackend::new(&store_path)))
        .with_context(|| format!("Failed to open alias store at {}", store_path.display()))?;

    match cli.command {
        Commands::Mask(args) => {
            let config = match &args.config {
                Some(path) => EngineConfig::load_from_file(path)?,
                None => EngineConfig::default(),
            };
            let mut engine = match &args.rules {
                Some(path) => {
                    let rules = RuleConfig::load_from_file(path)?;
                    MaskEngine::with_rules(store, config, &rules)?
                }
                None => MaskEngine::with_config(store, config)?,
            };
            if let Some(url) = &args.recognizer_url {
                match HttpRecognizer::new(url.clone()) {
                    Ok(recognizer) => engine = engine.with_recognizer(Box::new(recognizer)),
                    Err(e) => output::warn_msg(format!(
                        "Could not set up recognizer at {}: {}; continuing rule-only.",
                        url, e
                    )),
                }
            }

            let was_masked = commands::mask::run(engine, &args)?;
            if args.fail_if_masked && was_masked {
                std::process::exit(2);
            }
        }
        Commands::Unmask(args) => {
            let engine = MaskEngine::new(store)?;
            commands::unmask::run(&engine, &args)?;
        }
        Commands::Aliases(args) => {
            commands::aliases::run(&store, &args)?;
        }
    }

    Ok(())
}

/// The default alias store location under the platform data directory.
fn default_store_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .context("Could not determine a data directory; pass --store explicitly")?;
    Ok(base.join("veilmask").join("aliases.json"))
}
