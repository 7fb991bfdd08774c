pub mod command;
pub mod dump;
pub mod locker;
pub mod registry;
pub mod vault;

// Trait-based abstraction for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use command::ExecutionError;
pub use dump::{backup_file_name, DumpCommand, DumpOptions, PASSWORD_MASK};
pub use executor::{CommandExecutor, RealExecutor};
pub use locker::{LockError, RunLock};
pub use registry::{Connection, TargetRegistry};
pub use vault::{AgeVault, CredentialVault, UnavailableVault, VaultError};
