//! Test fixtures and sample data
//!
//! Provides the two-server sample setup and helpers shared by the test targets.

use crate::config_builder::ConfigBuilder;
use softbackup::utils::vault::mock::StaticVault;
use std::path::{Path, PathBuf};

/// Ciphertext stored for the `beta` server
pub const BETA_CIPHERTEXT: &str = "YWdlLWVuY3J5cHRpb24ub3JnL3YxCi0+IHNjcnlwdA==";

/// Plaintext behind [`BETA_CIPHERTEXT`]
pub const BETA_SECRET: &str = "secret123";

/// Secrets that would break a naive shell line or format string
pub const TRICKY_SECRETS: &[&str] = &[
    "secret123",
    "a",
    "p@ss word",
    "it's",
    "say \"hi\"",
    "100%done",
    "%s%d%n",
    "$(rm -rf /)",
    "`whoami`",
    "a;b|c&d",
    "back\\slash",
    "****",
    "-p******",
    "ünïcødé",
    "a very long passphrase that goes on for quite some time 0123456789",
];

/// `alpha` without a password, `beta` with [`BETA_CIPHERTEXT`]
///
/// Databases: `alpha:salesdb`, `beta:hrdb`.
pub fn alpha_beta_config() -> ConfigBuilder {
    ConfigBuilder::new()
        .add_server("alpha", "10.0.0.1", 3306, None)
        .add_server("beta", "10.0.0.2", 3307, Some(BETA_CIPHERTEXT))
        .add_database("alpha", "salesdb")
        .add_database("beta", "hrdb")
}

/// Vault able to decrypt the `beta` password
pub fn alpha_beta_vault() -> StaticVault {
    StaticVault::new().with_secret(BETA_CIPHERTEXT, BETA_SECRET)
}

/// Write a stand-in for mysqldump into `dir`
///
/// The script prints its arguments to stdout and exits 0, except for the
/// databases listed in `failing`, for which it prints an error on stderr
/// and exits 2.
#[cfg(unix)]
pub fn write_fake_dump(dir: &Path, failing: &[&str]) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let pattern = if failing.is_empty() {
        "__never__".to_string()
    } else {
        failing.join("|")
    };

    let script = format!(
        r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    {pattern})
      echo "mysqldump: Got error: 1049: Unknown database '$arg'" >&2
      exit 2
      ;;
  esac
done
echo "-- fake dump"
echo "-- args: $*"
"#
    );

    let path = dir.join("fake-mysqldump");
    std::fs::write(&path, script).expect("Failed to write fake dump script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake dump script executable");
    path
}

/// Count the lines of `logs` containing `needle`
pub fn count_lines(logs: &str, needle: &str) -> usize {
    logs.lines().filter(|line| line.contains(needle)).count()
}
