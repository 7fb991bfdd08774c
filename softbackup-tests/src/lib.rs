//! Test utilities for softbackup
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the softbackup runner.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, TestContext, MockExecutor, StaticVault};
//!
//! #[test]
//! fn my_test() {
//!     let config = ConfigBuilder::new()
//!         .add_server("alpha", "10.0.0.1", 3306, None)
//!         .add_database("alpha", "salesdb")
//!         .build();
//!     let ctx = TestContext::new();
//!     let (report, logs) = ctx.capture_logs(|| { /* ... */ });
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{CapturedLogs, TestContext};

// Re-export types from the main crate for convenience
pub use softbackup::config::{
    Config, DatabaseTarget, ExecutionMode, FileNaming, InlineDatabase, PathsConfig,
    ServerConfig, ServerDatabase, Settings, VaultConfig,
};
pub use softbackup::managers::backup::{BackupFailure, BackupManager, BackupOutcome, RunReport};

// Re-export mock implementations from the main crate
pub use softbackup::utils::executor::mock::{ExecutedCommand, MockExecutor, MockResponse};
pub use softbackup::utils::executor::CommandExecutor;
pub use softbackup::utils::vault::mock::StaticVault;
pub use softbackup::utils::vault::CredentialVault;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
