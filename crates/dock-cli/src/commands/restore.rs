//! Restore command implementation

use anyhow::Result;
use dock_core::backup::find_latest;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, RestoreArgs};
use crate::context::RuntimeContext;

/// Execute the restore command
pub async fn execute(args: &RestoreArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    let dir = args
        .dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.backups_dir());
    let pattern = args
        .pattern
        .as_deref()
        .unwrap_or(&ctx.config.backups.pattern);

    let artifact = find_latest(&dir, pattern)?;
    println!(
        "Latest backup: {} ({}, {} bytes)",
        artifact.path.display(),
        artifact.created_at.format("%Y-%m-%d %H:%M:%S"),
        artifact.size
    );

    if args.dry_run {
        return Ok(());
    }

    ctx.verbose(&format!("Restoring into {}", ctx.db.backend_name()));
    let report = dock_run::restore(ctx.db.as_ref(), &artifact).await?;

    println!(
        "Restored {} statements from {}",
        report.statements, report.path
    );

    Ok(())
}
