//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use softbackup::config::{
    Config, DatabaseTarget, ExecutionMode, FileNaming, InlineDatabase, PathsConfig,
    ServerConfig, ServerDatabase, Settings, VaultConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Username used for every test server
pub const TEST_USERNAME: &str = "backup";

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    paths: PathsConfig,
    vault: Option<VaultConfig>,
    settings: Settings,
    servers: Vec<ServerConfig>,
    databases: Vec<DatabaseTarget>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with backup and log directories in a temp dir
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let paths = PathsConfig {
            backup: temp_dir.path().join("backups"),
            log: temp_dir.path().join("logs"),
        };
        fs::create_dir_all(&paths.log).expect("Failed to create log directory");

        Self {
            temp_dir,
            paths,
            vault: None,
            settings: Settings::default(),
            servers: Vec::new(),
            databases: Vec::new(),
        }
    }

    /// Add a `[[servers]]` entry
    pub fn add_server(mut self, name: &str, address: &str, port: u16, password: Option<&str>) -> Self {
        self.servers.push(ServerConfig {
            name: name.to_string(),
            address: address.to_string(),
            port,
            username: TEST_USERNAME.to_string(),
            password: password.map(str::to_string),
        });
        self
    }

    /// Add a database referencing a server by name
    pub fn add_database(mut self, server: &str, database: &str) -> Self {
        self.databases.push(DatabaseTarget::Server(ServerDatabase {
            server: server.to_string(),
            database: database.to_string(),
        }));
        self
    }

    /// Add a database carrying its own connection parameters
    pub fn add_inline_database(
        mut self,
        name: Option<&str>,
        address: &str,
        port: u16,
        password: Option<&str>,
        database: &str,
    ) -> Self {
        self.databases.push(DatabaseTarget::Inline(InlineDatabase {
            name: name.map(str::to_string),
            address: address.to_string(),
            port,
            username: TEST_USERNAME.to_string(),
            password: password.map(str::to_string),
            database: database.to_string(),
        }));
        self
    }

    /// Write a passphrase file and point the vault at it
    pub fn with_vault_passphrase(mut self, passphrase: &str) -> Self {
        let passphrase_file = self.temp_dir.path().join("passphrase");
        fs::write(&passphrase_file, format!("{}\n", passphrase))
            .expect("Failed to write passphrase file");
        self.vault = Some(VaultConfig { passphrase_file });
        self
    }

    pub fn with_dump_program(mut self, program: impl AsRef<Path>) -> Self {
        self.settings.dump_program = program.as_ref().display().to_string();
        self
    }

    pub fn with_dump_args(mut self, args: &[&str]) -> Self {
        self.settings.dump_args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.settings.naming = naming;
        self
    }

    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.settings.execution = mode;
        self
    }

    /// Get the temp directory path
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Build the configuration
    pub fn build(&self) -> Config {
        Config {
            paths: self.paths.clone(),
            vault: self.vault.clone(),
            settings: self.settings.clone(),
            servers: self.servers.clone(),
            databases: self.databases.clone(),
        }
    }

    /// Build and return the config with its temp directory
    pub fn persist(self) -> (Config, TempDir) {
        let config = self.build();
        (config, self.temp_dir)
    }

    /// Write the config as TOML and return its path
    pub fn write(self) -> (PathBuf, Config, TempDir) {
        let config = self.build();
        let path = self.temp_dir.path().join("softbackup.toml");
        let contents = toml::to_string_pretty(&config).expect("Failed to serialize config");
        fs::write(&path, contents).expect("Failed to write config");
        (path, config, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
