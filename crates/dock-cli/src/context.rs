//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dock_core::Config;
use dock_db::Database;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Runtime context containing loaded configuration and database connection
pub struct RuntimeContext {
    /// Project root directory
    pub root: PathBuf,

    /// The loaded configuration
    pub config: Config,

    /// Database connection
    pub db: Arc<dyn Database>,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments.
    ///
    /// Configuration is loaded and validated before any connection is
    /// made: a missing connection string fails here with zero network
    /// calls.
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);

        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(&root).context("Failed to load project configuration")?
        };

        let target = Config::resolve_target(args.target.as_deref());
        let db_config = config
            .get_database_config(target.as_deref())
            .context("Failed to resolve target database")?;
        let db = dock_db::connect(&db_config).context("Failed to connect to database")?;

        if let Some(target) = &target {
            log::debug!("Using target '{}' ({})", target, db.backend_name());
        }

        Ok(Self {
            root,
            config,
            db,
            verbose: args.verbose,
        })
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }

    /// Absolute migrations directory
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Absolute backups directory
    pub fn backups_dir(&self) -> PathBuf {
        self.config.backups_dir_absolute(&self.root)
    }

    /// Absolute target (output) directory
    pub fn target_dir(&self) -> PathBuf {
        self.config.target_path_absolute(&self.root)
    }
}
