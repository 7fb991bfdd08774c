use super::types::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file is missing ({0})")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
///
/// Paths inside the file may start with `~`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let mut config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    expand_paths(&mut config);
    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.paths.backup = super::expand_tilde(&config.paths.backup);
    config.paths.log = super::expand_tilde(&config.paths.log);
    if let Some(ref mut vault) = config.vault {
        vault.passphrase_file = super::expand_tilde(&vault.passphrase_file);
    }
}

/// Validate the configuration
///
/// Unknown server references are not rejected here, they fail their own
/// target at run time.
fn validate_config(config: &Config) -> Result<()> {
    if config.paths.backup.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "paths.backup must not be empty".to_string(),
        ));
    }

    if config.paths.log.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "paths.log must not be empty".to_string(),
        ));
    }

    for (index, server) in config.servers.iter().enumerate() {
        if server.name.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Server #{}: name must not be empty",
                index + 1
            )));
        }
        validate_endpoint(&server.name, &server.address, server.port)?;
    }

    for (index, target) in config.databases.iter().enumerate() {
        if target.database().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Database #{}: database name must not be empty",
                index + 1
            )));
        }
        if let DatabaseTarget::Inline(inline) = target {
            validate_endpoint(inline.label(), &inline.address, inline.port)?;
        }
    }

    Ok(())
}

fn validate_endpoint(name: &str, address: &str, port: u16) -> Result<()> {
    if address.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Server '{}': address must not be empty",
            name
        )));
    }

    if port == 0 {
        return Err(ConfigError::ValidationError(format!(
            "Server '{}': port must not be 0",
            name
        )));
    }

    Ok(())
}
