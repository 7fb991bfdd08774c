//! Unit tests for configuration loading and validation

use serial_test::serial;
use softbackup::config::{
    config_path, load_config, ConfigError, DatabaseTarget, ExecutionMode, FileNaming,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
use std::path::PathBuf;
use test_utils::{alpha_beta_config, ConfigBuilder, TestContext, TestResult, BETA_CIPHERTEXT};

#[test]
fn test_config_round_trips_through_toml() {
    let (path, written, _temp_dir) = alpha_beta_config()
        .with_naming(FileNaming::ServerDatabase)
        .with_execution(ExecutionMode::Shell)
        .with_dump_args(&["--single-transaction"])
        .write();

    let loaded = load_config(&path);
    assert!(loaded.is_ok(), "Config should load successfully: {:?}", loaded.err());

    let loaded = loaded.unwrap();
    assert_eq!(loaded.servers.len(), 2);
    assert_eq!(loaded.databases.len(), 2);
    assert_eq!(loaded.paths.backup, written.paths.backup);
    assert_eq!(loaded.settings.naming, FileNaming::ServerDatabase);
    assert_eq!(loaded.settings.execution, ExecutionMode::Shell);
    assert_eq!(loaded.settings.dump_args, vec!["--single-transaction"]);
    assert_eq!(loaded.servers[1].encrypted_password(), Some(BETA_CIPHERTEXT));
    assert_eq!(loaded.servers[0].encrypted_password(), None);
}

#[test]
fn test_inline_target_round_trips() -> TestResult {
    let (path, _, _temp_dir) = ConfigBuilder::new()
        .add_inline_database(Some("legacy"), "10.0.0.9", 3306, None, "crm")
        .write();

    let config = load_config(&path)?;
    match &config.databases[0] {
        DatabaseTarget::Inline(inline) => {
            assert_eq!(inline.label(), "legacy");
            assert_eq!(inline.database, "crm");
        }
        other => panic!("Expected inline target, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_settings_default_when_section_missing() -> TestResult {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "softbackup.toml",
        r#"
[paths]
backup = "/tmp/backups"
log = "/tmp/logs"
"#,
    );

    let config = load_config(&path)?;
    assert_eq!(config.settings.dump_program, "mysqldump");
    assert_eq!(config.settings.log_level, "info");
    assert_eq!(config.settings.naming, FileNaming::Database);
    assert_eq!(config.settings.execution, ExecutionMode::Direct);
    assert_eq!(config.settings.timeout_seconds, 0);
    assert!(config.vault.is_none());
    assert!(config.databases.is_empty());
    Ok(())
}

#[test]
fn test_empty_password_means_no_password() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "softbackup.toml",
        r#"
[paths]
backup = "/tmp/backups"
log = "/tmp/logs"

[[servers]]
name = "alpha"
address = "10.0.0.1"
port = 3306
username = "backup"
password = ""
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.servers[0].encrypted_password(), None);
}

#[test]
fn test_unknown_server_reference_is_accepted() {
    let (path, _, _temp_dir) = ConfigBuilder::new().add_database("ghost", "x").write();

    // Resolved per target at run time, not rejected up front
    assert!(load_config(&path).is_ok());
}

#[test]
fn test_validation_rejects_empty_address() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "softbackup.toml",
        r#"
[paths]
backup = "/tmp/backups"
log = "/tmp/logs"

[[servers]]
name = "alpha"
address = ""
port = 3306
username = "backup"
"#,
    );

    let result = load_config(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_validation_rejects_empty_database() {
    let (path, _, _temp_dir) = ConfigBuilder::new()
        .add_server("alpha", "10.0.0.1", 3306, None)
        .add_database("alpha", "")
        .write();

    let result = load_config(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_target_with_unknown_fields_is_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "softbackup.toml",
        r#"
[paths]
backup = "/tmp/backups"
log = "/tmp/logs"

[[databases]]
server = "alpha"
database = "salesdb"
compress = true
"#,
    );

    assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
}

#[test]
#[serial]
fn test_config_path_env_override() {
    std::env::set_var(CONFIG_PATH_ENV, "/etc/softbackup/softbackup.toml");
    assert_eq!(config_path(), PathBuf::from("/etc/softbackup/softbackup.toml"));

    // Empty counts as unset
    std::env::set_var(CONFIG_PATH_ENV, "");
    assert!(config_path().ends_with(DEFAULT_CONFIG_PATH));

    std::env::remove_var(CONFIG_PATH_ENV);
    assert!(config_path().ends_with(DEFAULT_CONFIG_PATH));
}

#[test]
#[serial]
fn test_config_path_env_expands_tilde() {
    std::env::set_var(CONFIG_PATH_ENV, "~/backup.toml");
    let path = config_path();
    std::env::remove_var(CONFIG_PATH_ENV);

    assert!(!path.starts_with("~"));
    assert!(path.ends_with("backup.toml"));
}
