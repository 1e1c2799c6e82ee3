//! Status command implementation

use anyhow::Result;
use dock_core::migration::discover_migrations;
use dock_run::Ledger;
use std::collections::HashSet;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the status command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let migrations = discover_migrations(&ctx.migrations_dir())?;

    let ledger = Ledger::new(ctx.db.as_ref(), &ctx.config.migrations.table);
    ledger.ensure_table().await?;
    let applied: HashSet<String> = ledger.applied_ids().await?.into_iter().collect();

    let mut pending = 0;
    println!("Migrations in {}:\n", ctx.migrations_dir().display());
    for migration in &migrations {
        if applied.contains(migration.id.as_str()) {
            println!("  \u{2713} {} (applied)", migration.id);
        } else {
            pending += 1;
            println!("  \u{00b7} {} (pending)", migration.id);
        }
    }

    // success rows whose SQL file has since disappeared deserve a mention
    let known: HashSet<&str> = migrations.iter().map(|m| m.id.as_str()).collect();
    for id in applied.iter().filter(|id| !known.contains(id.as_str())) {
        println!("  ? {} (applied, but not in the migrations directory)", id);
    }

    println!();
    println!("{} applied, {} pending", applied.len(), pending);

    Ok(())
}
