//! Encrypted credential storage
//!
//! Passwords in the config file are age passphrase-encrypted payloads,
//! base64 encoded so they fit on one TOML line.

use age::secrecy::{ExposeSecret, SecretString};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::io::{self, Read, Write};
use std::iter;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("No credential vault available: {0}")]
    Unavailable(String),

    #[error("Failed to read passphrase file {path}: {source}")]
    PassphraseFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Passphrase file {0} is empty")]
    EmptyPassphrase(PathBuf),

    #[error("Encrypted password is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Failed to decrypt password: {0}")]
    Decrypt(#[from] age::DecryptError),

    #[error("Decrypted password is not valid UTF-8")]
    NotUtf8,

    #[error("I/O error while processing password: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;

/// Turns a stored ciphertext into the plaintext secret
pub trait CredentialVault {
    fn decrypt(&self, ciphertext: &str) -> Result<SecretString>;
}

/// Vault backed by an age passphrase
pub struct AgeVault {
    passphrase: SecretString,
}

impl AgeVault {
    pub fn new(passphrase: SecretString) -> Self {
        Self { passphrase }
    }

    /// Read the passphrase from a file, ignoring the trailing newline
    pub fn from_passphrase_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| VaultError::PassphraseFile {
            path: path.to_path_buf(),
            source,
        })?;
        let passphrase = contents.trim_end_matches(['\r', '\n']);
        if passphrase.is_empty() {
            return Err(VaultError::EmptyPassphrase(path.to_path_buf()));
        }

        debug!("Loaded vault passphrase from {:?}", path);
        Ok(Self::new(SecretString::from(passphrase.to_string())))
    }

    /// Produce a ciphertext suitable for a `password` config field
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let passphrase = SecretString::from(self.passphrase.expose_secret().to_string());
        let encryptor = age::Encryptor::with_user_passphrase(passphrase);

        let mut encrypted = Vec::new();
        let mut writer = encryptor.wrap_output(&mut encrypted)?;
        writer.write_all(plaintext.as_bytes())?;
        writer.finish()?;

        Ok(STANDARD.encode(encrypted))
    }
}

impl CredentialVault for AgeVault {
    fn decrypt(&self, ciphertext: &str) -> Result<SecretString> {
        let encrypted = STANDARD.decode(ciphertext.trim())?;
        let decryptor = age::Decryptor::new(&encrypted[..])?;

        let identity = age::scrypt::Identity::new(SecretString::from(
            self.passphrase.expose_secret().to_string(),
        ));
        let mut reader = decryptor.decrypt(iter::once(&identity as &dyn age::Identity))?;

        let mut plaintext = Vec::new();
        reader.read_to_end(&mut plaintext)?;
        let plaintext = String::from_utf8(plaintext).map_err(|_| VaultError::NotUtf8)?;

        Ok(SecretString::from(plaintext))
    }
}

/// Stand-in used when no passphrase could be loaded
///
/// Targets without a password still run; the others fail individually.
pub struct UnavailableVault {
    reason: String,
}

impl UnavailableVault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CredentialVault for UnavailableVault {
    fn decrypt(&self, _ciphertext: &str) -> Result<SecretString> {
        Err(VaultError::Unavailable(self.reason.clone()))
    }
}

/// In-memory vault for tests
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Maps ciphertexts to plaintexts, unknown ciphertexts fail to decrypt
    #[derive(Clone, Debug, Default)]
    pub struct StaticVault {
        secrets: HashMap<String, String>,
    }

    impl StaticVault {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_secret(mut self, ciphertext: &str, plaintext: &str) -> Self {
            self.secrets
                .insert(ciphertext.to_string(), plaintext.to_string());
            self
        }
    }

    impl CredentialVault for StaticVault {
        fn decrypt(&self, ciphertext: &str) -> Result<SecretString> {
            self.secrets
                .get(ciphertext)
                .map(|plaintext| SecretString::from(plaintext.clone()))
                .ok_or_else(|| {
                    VaultError::Unavailable(format!("no secret stored for '{}'", ciphertext))
                })
        }
    }
}
