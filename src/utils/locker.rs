//! File-based locking to prevent overlapping runs

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Failed to open lock file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Another backup run holds the lock {0:?}")]
    Held(PathBuf),
}

/// Name of the lock file inside the log directory
pub const LOCK_FILE_NAME: &str = "softbackup.lock";

/// Lock file shared by every run using the same log directory
pub struct RunLock {
    lock: RwLock<File>,
    path: PathBuf,
}

/// Held for the whole run, released on drop
pub struct RunLockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
    path: &'a Path,
}

impl RunLock {
    /// Open (or create) the lock file inside `dir`
    pub fn in_directory(dir: &Path) -> Result<Self, LockError> {
        Self::open(&dir.join(LOCK_FILE_NAME))
    }

    pub fn open(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LockError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            lock: RwLock::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Take the exclusive lock without waiting
    pub fn try_acquire(&mut self) -> Result<RunLockGuard<'_>, LockError> {
        debug!("Attempting to acquire lock: {:?}", self.path);

        let guard = self
            .lock
            .try_write()
            .map_err(|_| LockError::Held(self.path.clone()))?;

        info!("Acquired run lock: {:?}", self.path);

        Ok(RunLockGuard {
            _guard: guard,
            path: &self.path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLockGuard<'_> {
    fn drop(&mut self) {
        debug!("Released run lock: {:?}", self.path);
    }
}
