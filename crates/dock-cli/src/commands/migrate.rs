//! Migrate command implementation

use anyhow::Result;
use dock_core::migration::{discover_migrations, find_migration};
use dock_run::{MigrationExecutor, MigrationStatus};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{millis, EXIT_COMMITTED_WITH_WARNINGS, EXIT_MIGRATION};
use crate::context::RuntimeContext;

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let dir = ctx.migrations_dir();

    let migrations = match &args.id {
        Some(id) => vec![find_migration(&dir, id)?],
        None => discover_migrations(&dir)?,
    };

    if migrations.is_empty() {
        println!("No migrations found in {}", dir.display());
        return Ok(());
    }

    ctx.verbose(&format!(
        "Found {} migrations in {}",
        migrations.len(),
        dir.display()
    ));
    println!("Running {} migrations...\n", migrations.len());

    let executor = MigrationExecutor::new(ctx.db.as_ref(), &ctx.config.migrations.table);
    let report = executor.apply_all(&migrations).await?;

    for outcome in &report.outcomes {
        match outcome.status {
            MigrationStatus::Applied => println!(
                "  \u{2713} {} (applied) [{}ms]",
                outcome.id,
                millis(outcome.duration_secs)
            ),
            MigrationStatus::Skipped => println!("  - {} (already applied)", outcome.id),
            MigrationStatus::Failed => println!(
                "  \u{2717} {} - {}",
                outcome.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
        for warning in outcome.warnings() {
            println!(
                "    ! verification failed: {} ({})",
                warning.describe(),
                warning.detail.as_deref().unwrap_or("no detail")
            );
        }
    }

    println!();
    println!(
        "Applied {}, skipped {}, {} verification warnings",
        report.applied(),
        report.skipped(),
        report.warning_count()
    );

    if report.failed() > 0 {
        eprintln!(
            "Migration failed. Migrations applied earlier in this run remain committed; \
             fix the script and re-invoke (already-applied migrations are skipped)."
        );
        std::process::exit(EXIT_MIGRATION);
    }

    if report.warning_count() > 0 {
        eprintln!(
            "Schema changes are COMMITTED; only their verification probes failed. \
             Inspect the probes or the target schema before re-running."
        );
        std::process::exit(EXIT_COMMITTED_WITH_WARNINGS);
    }

    Ok(())
}
