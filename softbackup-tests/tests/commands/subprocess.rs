//! Runs against a real subprocess standing in for mysqldump

#![cfg(unix)]

use softbackup::utils::{AgeVault, RealExecutor};
use std::fs;
use std::time::Duration;
use test_utils::{
    alpha_beta_config, alpha_beta_vault, write_fake_dump, BackupFailure, BackupManager,
    ConfigBuilder, ExecutionMode, TestContext, BETA_SECRET,
};

#[test]
fn test_direct_mode_writes_artifacts() {
    let builder = alpha_beta_config();
    let script = write_fake_dump(builder.temp_path(), &["hrdb"]);
    let (config, _temp_dir) = builder.with_dump_program(&script).persist();

    let vault = alpha_beta_vault();
    let executor = RealExecutor::new(ExecutionMode::Direct, None).unwrap();
    let ctx = TestContext::new();

    let (report, logs) = ctx.capture_logs(|| BackupManager::new(&config, &vault, &executor).run());

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let artifact = report.outcomes[0].artifact().unwrap();
    let contents = fs::read_to_string(artifact).unwrap();
    assert!(contents.contains("-- fake dump"));
    assert!(contents.contains("--host 10.0.0.1 -P 3306 -u backup salesdb"));

    let output = report.outcomes[1].output().unwrap();
    assert!(output.contains("Unknown database 'hrdb'"));
    assert!(logs.contains("Output : mysqldump: Got error: 1049"));
    assert!(!logs.contains(BETA_SECRET));
}

#[test]
fn test_shell_mode_redirects_output() {
    let builder = alpha_beta_config().with_execution(ExecutionMode::Shell);
    let script = write_fake_dump(builder.temp_path(), &[]);
    let (config, _temp_dir) = builder.with_dump_program(&script).persist();

    let vault = alpha_beta_vault();
    let executor = RealExecutor::from_settings(&config.settings).unwrap();
    let report = BackupManager::new(&config, &vault, &executor).run();

    assert_eq!(report.succeeded(), 2);
    let contents = fs::read_to_string(report.outcomes[1].artifact().unwrap()).unwrap();
    // The plaintext reaches the program, only the log is masked
    assert!(contents.contains(&format!("-p{}", BETA_SECRET)));
}

#[test]
fn test_missing_program_fails_every_target() {
    let (config, _temp_dir) = alpha_beta_config()
        .with_dump_program("/nonexistent/mysqldump")
        .persist();

    let vault = alpha_beta_vault();
    let executor = RealExecutor::new(ExecutionMode::Direct, Some(Duration::from_secs(10))).unwrap();
    let report = BackupManager::new(&config, &vault, &executor).run();

    assert_eq!(report.failed(), 2);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.failure(), Some(BackupFailure::Execution(_)))));
}

#[test]
fn test_age_encrypted_password_reaches_program() {
    let builder = ConfigBuilder::new().with_vault_passphrase("correct horse battery staple");
    let script = write_fake_dump(builder.temp_path(), &[]);
    let passphrase_file = builder.build().vault.unwrap().passphrase_file;

    let vault = AgeVault::from_passphrase_file(&passphrase_file).unwrap();
    let ciphertext = vault.encrypt("w0rd;$x").unwrap();

    let (config, _temp_dir) = builder
        .with_dump_program(&script)
        .add_inline_database(Some("legacy"), "10.0.0.9", 3306, Some(ciphertext.as_str()), "crm")
        .persist();

    let executor = RealExecutor::from_settings(&config.settings).unwrap();
    let ctx = TestContext::new();

    let (report, logs) = ctx.capture_logs(|| BackupManager::new(&config, &vault, &executor).run());

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.outcomes[0].target, "legacy:crm");
    let contents = fs::read_to_string(report.outcomes[0].artifact().unwrap()).unwrap();
    assert!(contents.contains("-pw0rd;$x"));
    assert!(logs.contains("-u backup -p****** crm"));
    assert!(!logs.contains("w0rd"));
}
