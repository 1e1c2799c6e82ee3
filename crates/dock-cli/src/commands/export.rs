//! Export command implementation

use anyhow::Result;
use dock_core::TransferPlan;
use dock_run::transfer;
use std::path::PathBuf;

use crate::cli::{ExportArgs, GlobalArgs};
use crate::context::RuntimeContext;

/// Execute the export command
pub async fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    if ctx.config.tables.is_empty() {
        println!("No tables configured.");
        return Ok(());
    }

    let plan = TransferPlan::from_tables(&ctx.config.tables)?;
    ctx.verbose(&format!(
        "Exporting {} tables from {}",
        plan.len(),
        ctx.db.backend_name()
    ));

    let dump = transfer::export(ctx.db.as_ref(), &plan).await?;

    for (name, table) in &dump.tables {
        println!("  \u{2713} {} ({} rows)", name, table.row_count());
    }

    let output = args
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.target_dir().join("dump.json"));
    dump.save(&output)?;

    println!();
    println!(
        "Exported {} tables ({} rows) to {}",
        dump.tables.len(),
        dump.total_rows(),
        output.display()
    );

    Ok(())
}
