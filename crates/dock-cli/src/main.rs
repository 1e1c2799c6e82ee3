//! Dockhand CLI - batch database migration and data transfer orchestration

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::{
    EXIT_CONFIG, EXIT_CONNECTION, EXIT_GENERAL, EXIT_MIGRATION, EXIT_MISSING_DATA, EXIT_NO_BACKUP,
    EXIT_PLANNING, EXIT_TRANSFER,
};
use commands::{export, import, migrate, plan, restore, status};
use dock_core::CoreError;
use dock_db::DbError;
use dock_run::RunError;

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(&cli).await;
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Status => status::execute(&cli.global).await,
        cli::Commands::Plan(args) => plan::execute(args, &cli.global).await,
        cli::Commands::Export(args) => export::execute(args, &cli.global).await,
        cli::Commands::Import(args) => import::execute(args, &cli.global).await,
        cli::Commands::Restore(args) => restore::execute(args, &cli.global).await,
    }
}

/// Map an error to its exit code. Fatal classes get distinct codes so
/// wrapper scripts can tell a config bug from an unreachable target.
fn exit_code(err: &anyhow::Error) -> i32 {
    // RunError wraps core/db errors transparently, so inspect it first
    if let Some(run) = err.downcast_ref::<RunError>() {
        return match run {
            RunError::Migration { .. } => EXIT_MIGRATION,
            RunError::Transfer { .. } | RunError::Restore { .. } => EXIT_TRANSFER,
            RunError::MissingData { .. } => EXIT_MISSING_DATA,
            RunError::Core(e) => core_exit_code(e),
            RunError::Db(e) => db_exit_code(e),
        };
    }
    if let Some(core) = err.downcast_ref::<CoreError>() {
        return core_exit_code(core);
    }
    if let Some(db) = err.downcast_ref::<DbError>() {
        return db_exit_code(db);
    }
    EXIT_GENERAL
}

fn core_exit_code(err: &CoreError) -> i32 {
    match err {
        CoreError::CircularDependency { .. } => EXIT_PLANNING,
        CoreError::NoBackupFound { .. } => EXIT_NO_BACKUP,
        _ => EXIT_CONFIG,
    }
}

fn db_exit_code(err: &DbError) -> i32 {
    match err {
        DbError::ConnectionError(_) => EXIT_CONNECTION,
        _ => EXIT_GENERAL,
    }
}
