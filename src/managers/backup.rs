//! Backup manager - orchestrates one run over all configured databases

use crate::config::{Config, DatabaseTarget};
use crate::utils::command::ExecutionError;
use crate::utils::dump::{backup_file_name, DumpCommand, DumpOptions};
use crate::utils::executor::CommandExecutor;
use crate::utils::registry::TargetRegistry;
use crate::utils::vault::{CredentialVault, VaultError};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Why a single target could not be backed up
#[derive(Debug, thiserror::Error)]
pub enum BackupFailure {
    #[error("Target server '{0}' is unknown")]
    UnknownServer(String),

    #[error(transparent)]
    Credential(#[from] VaultError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Result of one target in one run
#[derive(Debug)]
pub struct BackupOutcome {
    /// `<server>:<database>`
    pub target: String,
    /// Path of the artifact on success
    pub result: Result<PathBuf, BackupFailure>,
}

impl BackupOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.result.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn failure(&self) -> Option<&BackupFailure> {
        self.result.as_ref().err()
    }

    /// Output captured from a dump that exited unsuccessfully
    pub fn output(&self) -> Option<&str> {
        match self.failure() {
            Some(BackupFailure::Execution(err)) => err.output(),
            _ => None,
        }
    }
}

/// Outcomes of a run, in configuration order
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<BackupOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct BackupManager<'a> {
    config: &'a Config,
    registry: TargetRegistry,
    vault: &'a dyn CredentialVault,
    executor: &'a dyn CommandExecutor,
    options: DumpOptions,
}

impl<'a> BackupManager<'a> {
    /// Create new backup manager
    pub fn new(
        config: &'a Config,
        vault: &'a dyn CredentialVault,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            config,
            registry: TargetRegistry::build(&config.servers),
            vault,
            executor,
            options: DumpOptions::from_settings(&config.settings),
        }
    }

    /// Run backups for every configured database
    pub fn run(&self) -> RunReport {
        self.log_configuration();
        self.ensure_backup_directory();

        RunReport {
            outcomes: self.run_targets(&self.config.databases),
        }
    }

    /// Back up `targets` one after another
    ///
    /// A failing target is logged and recorded; the remaining targets still
    /// run. Logs the finish marker once all targets were attempted.
    pub fn run_targets(&self, targets: &[DatabaseTarget]) -> Vec<BackupOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            outcomes.push(self.backup_target(target));
        }

        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        info!(
            "Finished backing up databases! ({} succeeded, {} failed)",
            succeeded,
            outcomes.len() - succeeded
        );

        outcomes
    }

    /// Back up a single database and log the result
    pub fn backup_target(&self, target: &DatabaseTarget) -> BackupOutcome {
        let label = format!("{}:{}", target.server_name(), target.database());
        info!("Starting backup of database '{}'", label);

        let result = self.backup(target);
        match &result {
            Ok(path) => {
                info!("Successfully backed up database '{}' to {:?}", label, path);
            }
            Err(e) => {
                error!("Failed to back up database '{}': {}", label, e);
                if let BackupFailure::Execution(err) = e {
                    if let Some(output) = err.output() {
                        error!("Output : {}", output.trim_end());
                    }
                }
            }
        }

        BackupOutcome {
            target: label,
            result,
        }
    }

    fn backup(&self, target: &DatabaseTarget) -> Result<PathBuf, BackupFailure> {
        let connection = self
            .registry
            .connection_for(target)
            .ok_or_else(|| BackupFailure::UnknownServer(target.server_name().to_string()))?;

        let file_name = backup_file_name(
            &connection,
            target.database(),
            self.config.settings.naming,
            &Local::now(),
        );
        let output_path = self.config.paths.backup.join(file_name);

        let command = DumpCommand::build(
            &connection,
            target.database(),
            &output_path,
            &self.options,
            self.vault,
        )?;

        // Only the masked form is ever logged
        info!("Executing command : {}", command.loggable_line());
        self.executor.execute(&command)?;

        Ok(output_path)
    }

    /// Log the run banner and a summary of the configuration
    pub fn log_configuration(&self) {
        info!("-------------------");
        info!("softbackup {}", crate::VERSION);
        info!("-------------------");
        info!("Servers to backup:");
        for server in &self.config.servers {
            info!("    {}", server);
        }
        info!("Databases to backup:");
        for target in &self.config.databases {
            info!("    {}", target);
        }
        info!("Paths:");
        info!("    Backup : {}", self.config.paths.backup.display());
        info!("    Log    : {}", self.config.paths.log.display());

        if self.config.databases.is_empty() {
            warn!("No databases configured, nothing to back up");
        }
    }

    fn ensure_backup_directory(&self) {
        let dir = &self.config.paths.backup;
        if let Err(e) = fs::create_dir_all(dir) {
            warn!("Failed to create backup directory {:?}: {}", dir, e);
        }
    }
}
