//! Aliases command implementation: inspect the alias store.
//! License: MIT OR Apache-2.0

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};

use veilmask_core::store::fingerprint;
use veilmask_core::{AliasStore, Category};

use crate::cli::AliasesCommand;

/// Runs the `aliases` subcommand against an already-opened store.
pub fn run(store: &AliasStore, args: &AliasesCommand) -> Result<()> {
    if args.json {
        print_counts_json(store)?;
    } else if args.full {
        print_entries(store, args.reveal);
    } else {
        print_counts(store);
    }
    Ok(())
}

fn print_counts_json(store: &AliasStore) -> Result<()> {
    let mut counts = serde_json::Map::new();
    for category in Category::ALL {
        counts.insert(
            category.as_str().to_string(),
            serde_json::Value::from(store.count_for(category)),
        );
    }
    let report = serde_json::json!({ "categories": counts, "total": store.len() });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_counts(store: &AliasStore) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Category", "Aliases"]);
    for category in Category::ALL {
        table.add_row(vec![Cell::new(category), Cell::new(store.count_for(category))]);
    }
    table.add_row(vec![Cell::new("Total"), Cell::new(store.len())]);
    println!("{table}");
}

fn print_entries(store: &AliasStore, reveal: bool) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Placeholder", "Category", "Created", "Original"]);
    for entry in store.entries() {
        let original = if reveal {
            entry.original.clone()
        } else {
            // Fingerprints identify entries without printing PII.
            format!("sha256:{}", fingerprint(&entry.original))
        };
        table.add_row(vec![
            Cell::new(&entry.alias),
            Cell::new(entry.category),
            Cell::new(&entry.created_at),
            Cell::new(original),
        ]);
    }
    println!("{table}");
}
