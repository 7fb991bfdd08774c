use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub vault: Option<VaultConfig>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub databases: Vec<DatabaseTarget>,
}

/// Output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory receiving the `.sql` dumps
    pub backup: PathBuf,
    /// Directory holding `softbackup.log`
    pub log: PathBuf,
}

/// Where the passphrase for stored credentials lives
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultConfig {
    pub passphrase_file: PathBuf,
}

/// Tuning knobs, every field is optional in the file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dump utility, resolved through PATH
    #[serde(default = "default_dump_program")]
    pub dump_program: String,

    /// Extra arguments placed right before the database name
    #[serde(default)]
    pub dump_args: Vec<String>,

    #[serde(default)]
    pub naming: FileNaming,

    #[serde(default)]
    pub execution: ExecutionMode,

    /// Per-target timeout, 0 disables it
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dump_program: default_dump_program(),
            dump_args: Vec::new(),
            naming: FileNaming::default(),
            execution: ExecutionMode::default(),
            timeout_seconds: 0,
        }
    }
}

/// How backup artifacts are named
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// `<database>_<timestamp>.sql`
    #[default]
    Database,
    /// `<server>_<database>_<timestamp>.sql`
    ServerDatabase,
}

/// How the dump utility is launched
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Argument vector, no shell involved; stdout goes to the artifact
    #[default]
    Direct,
    /// `sh -c "<command line>"` with shell redirection
    Shell,
}

/// A database server and the credentials used to dump from it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub username: String,
    /// Encrypted password, empty means no password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ServerConfig {
    pub fn encrypted_password(&self) -> Option<&str> {
        non_empty(self.password.as_deref())
    }
}

// Never prints the password, encrypted or not.
impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10}: {:<13} (port:{}, user:{})",
            self.name, self.address, self.port, self.username
        )
    }
}

/// One database scheduled for backup
///
/// Either references a `[[servers]]` entry by name or carries its own
/// connection parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DatabaseTarget {
    Inline(InlineDatabase),
    Server(ServerDatabase),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerDatabase {
    pub server: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InlineDatabase {
    /// Label used in logs and file names, defaults to the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub database: String,
}

impl InlineDatabase {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }

    pub fn encrypted_password(&self) -> Option<&str> {
        non_empty(self.password.as_deref())
    }
}

impl DatabaseTarget {
    pub fn database(&self) -> &str {
        match self {
            DatabaseTarget::Inline(inline) => &inline.database,
            DatabaseTarget::Server(target) => &target.database,
        }
    }

    /// Referenced server name, or the inline label
    pub fn server_name(&self) -> &str {
        match self {
            DatabaseTarget::Inline(inline) => inline.label(),
            DatabaseTarget::Server(target) => &target.server,
        }
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10}: {}", self.server_name(), self.database())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dump_program() -> String {
    "mysqldump".to_string()
}
