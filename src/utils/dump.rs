//! Dump command construction
//!
//! A [`DumpCommand`] keeps the decrypted password as a distinct argument so
//! it can be rendered twice: once with the plaintext for execution and once
//! with [`PASSWORD_MASK`] for the log.

use super::registry::Connection;
use super::vault::{CredentialVault, VaultError};
use crate::config::{FileNaming, Settings};
use age::secrecy::{ExposeSecret, SecretString};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// Shown in place of the password, whatever its length
pub const PASSWORD_MASK: &str = "******";

/// Fixed width and lexically sortable, minute granularity
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Program and extra arguments shared by all targets
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub program: String,
    pub extra_args: Vec<String>,
}

impl DumpOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            program: settings.dump_program.clone(),
            extra_args: settings.dump_args.clone(),
        }
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

enum DumpArg {
    Plain(String),
    /// Rendered as `-p<password>`
    Password(SecretString),
}

impl DumpArg {
    fn render(&self, reveal: bool) -> String {
        match self {
            DumpArg::Plain(arg) => arg.clone(),
            DumpArg::Password(secret) if reveal => format!("-p{}", secret.expose_secret()),
            DumpArg::Password(_) => format!("-p{}", PASSWORD_MASK),
        }
    }
}

/// A fully resolved dump invocation for one database
pub struct DumpCommand {
    program: String,
    args: Vec<DumpArg>,
    database: String,
    output_path: PathBuf,
}

impl DumpCommand {
    /// Build the command, decrypting the password if one is configured
    pub fn build(
        connection: &Connection<'_>,
        database: &str,
        output_path: &Path,
        options: &DumpOptions,
        vault: &dyn CredentialVault,
    ) -> Result<Self, VaultError> {
        let mut args = vec![
            DumpArg::Plain("--host".to_string()),
            DumpArg::Plain(connection.address().to_string()),
            DumpArg::Plain("-P".to_string()),
            DumpArg::Plain(connection.port().to_string()),
            DumpArg::Plain("-u".to_string()),
            DumpArg::Plain(connection.username().to_string()),
        ];

        if let Some(ciphertext) = connection.encrypted_password() {
            args.push(DumpArg::Password(vault.decrypt(ciphertext)?));
        }

        args.extend(options.extra_args.iter().cloned().map(DumpArg::Plain));
        args.push(DumpArg::Plain(database.to_string()));

        Ok(Self {
            program: options.program.clone(),
            args,
            database: database.to_string(),
            output_path: output_path.to_path_buf(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn has_password(&self) -> bool {
        self.args.iter().any(|arg| matches!(arg, DumpArg::Password(_)))
    }

    /// Arguments to pass to the program, password in plaintext
    pub fn executable_args(&self) -> Vec<String> {
        self.args.iter().map(|arg| arg.render(true)).collect()
    }

    /// Shell form of the command, password in plaintext. Never log this.
    pub fn executable_line(&self) -> String {
        self.render(true)
    }

    /// Shell form of the command with the password masked
    pub fn loggable_line(&self) -> String {
        self.render(false)
    }

    fn render(&self, reveal: bool) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.render(reveal));
        }
        line.push_str(" > ");
        line.push_str(&self.output_path.display().to_string());
        line
    }
}

impl fmt::Display for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loggable_line())
    }
}

impl fmt::Debug for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DumpCommand")
            .field(&self.loggable_line())
            .finish()
    }
}

/// Name of the artifact for a database dumped at `at`
///
/// Two dumps of the same database within one minute get the same name and
/// the later one overwrites the earlier.
pub fn backup_file_name(
    connection: &Connection<'_>,
    database: &str,
    naming: FileNaming,
    at: &DateTime<Local>,
) -> String {
    let timestamp = at.format(TIMESTAMP_FORMAT);
    match naming {
        FileNaming::Database => format!("{}_{}.sql", database, timestamp),
        FileNaming::ServerDatabase => {
            format!("{}_{}_{}.sql", connection.server_name(), database, timestamp)
        }
    }
}
