//! softbackup library
//!
//! This library provides the backup run for MySQL databases: it resolves
//! each configured database to its server, builds a `mysqldump` command
//! whose logged form never carries the password, and runs the dumps one
//! after another.

pub mod config;
pub mod managers;
pub mod utils;

/// Crate version, printed by `-v`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use config::{load_config, Config};
pub use managers::backup::{BackupFailure, BackupManager, BackupOutcome, RunReport};
pub use managers::logging::{init_logging, LogGuard, LoggingConfig};
