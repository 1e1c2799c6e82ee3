//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Dockhand - batch database migration and data transfer orchestration
#[derive(Parser, Debug)]
#[command(name = "dockhand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target (database connection) to run against
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations and verify their post-conditions
    Migrate(MigrateArgs),

    /// Show applied and pending migrations
    Status,

    /// Print the computed delete/insert table orders
    Plan(PlanArgs),

    /// Export all configured tables to a dump file
    Export(ExportArgs),

    /// Replace all configured tables with a dump file's contents
    Import(ImportArgs),

    /// Locate the most recent backup and execute it
    Restore(RestoreArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Apply only this migration (default: all pending)
    #[arg(short, long)]
    pub id: Option<String>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: PlanOutput,
}

/// Plan output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutput {
    /// Human-readable lists
    Text,
    /// JSON object with both orders
    Json,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: <target_path>/dump.json)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Dump file to import
    pub input: String,

    /// Treat planned tables missing from the dump as empty
    #[arg(long)]
    pub allow_missing: bool,
}

/// Arguments for the restore command
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup directory (default: from config)
    #[arg(long)]
    pub dir: Option<String>,

    /// Filename pattern (default: from config)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Locate and print the artifact without executing it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
