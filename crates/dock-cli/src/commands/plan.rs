//! Plan command implementation
//!
//! Pure planning: loads the configuration, builds the dependency graph,
//! and prints both orders. Never opens a database connection, so it also
//! serves as a config check.

use anyhow::{Context, Result};
use dock_core::{Config, TransferPlan};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, PlanArgs, PlanOutput};

/// Execute the plan command
pub async fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let root = PathBuf::from(&global.project_dir);
    let config = if let Some(config_path) = &global.config {
        Config::load(Path::new(config_path)).context("Failed to load configuration file")?
    } else {
        Config::load_from_dir(&root).context("Failed to load project configuration")?
    };

    if config.tables.is_empty() {
        println!("No tables configured.");
        return Ok(());
    }

    let plan = TransferPlan::from_tables(&config.tables)?;

    match args.output {
        PlanOutput::Text => {
            println!("Delete order (children first):");
            for (i, table) in plan.delete_order().iter().enumerate() {
                println!("  {}. {}", i + 1, table);
            }
            println!();
            println!("Insert order (parents first):");
            for (i, table) in plan.insert_order().iter().enumerate() {
                println!("  {}. {}", i + 1, table);
            }
        }
        PlanOutput::Json => {
            let json = serde_json::json!({
                "delete_order": plan.delete_order(),
                "insert_order": plan.insert_order(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
