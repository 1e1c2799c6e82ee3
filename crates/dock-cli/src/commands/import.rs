//! Import command implementation

use anyhow::Result;
use dock_core::Dump;
use dock_run::{transfer, ImportOptions};
use std::path::Path;

use crate::cli::{GlobalArgs, ImportArgs};
use crate::commands::common::EXIT_COMMITTED_WITH_WARNINGS;
use crate::context::RuntimeContext;

/// Execute the import command
pub async fn execute(args: &ImportArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    if ctx.config.tables.is_empty() {
        println!("No tables configured.");
        return Ok(());
    }

    let dump = Dump::load(Path::new(&args.input))?;
    println!(
        "Importing {} ({} tables, {} rows) into {}...\n",
        args.input,
        dump.tables.len(),
        dump.total_rows(),
        ctx.db.backend_name()
    );

    let options = ImportOptions {
        allow_missing: args.allow_missing,
        state_path: Some(ctx.target_dir().join("transfer_state.json")),
    };
    let report = transfer::replace(ctx.db.as_ref(), &ctx.config.tables, &dump, &options).await?;

    for table in &report.tables {
        println!(
            "  \u{2713} {} (deleted {}, inserted {})",
            table.table, table.deleted, table.inserted
        );
    }

    println!();
    println!(
        "Imported {} rows across {} tables",
        report.total_inserted(),
        report.tables.len()
    );

    if !report.is_clean() {
        eprintln!();
        for discrepancy in &report.discrepancies {
            eprintln!("  \u{2717} {}", discrepancy);
        }
        eprintln!(
            "Row counts do not match the dump. The inserted data is already COMMITTED; \
             no rollback was performed. Inspect the target and re-import if needed."
        );
        std::process::exit(EXIT_COMMITTED_WITH_WARNINGS);
    }

    Ok(())
}
