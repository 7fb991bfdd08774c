//! Running dump commands with proper error handling and timeouts

use super::dump::DumpCommand;
use crate::config::ExecutionMode;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(unix)]
const SHELL: (&str, &str) = ("sh", "-c");

#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");

/// Shell line for `command`
///
/// On unix the dump program replaces the shell through `exec`, so a kill
/// on timeout reaches the program itself and not only its wrapper.
fn shell_line(command: &DumpCommand) -> String {
    if cfg!(unix) {
        format!("exec {}", command.executable_line())
    } else {
        command.executable_line()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create backup file {path:?}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} {}", describe_exit(.code))]
    Exited {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{program} timed out after {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },
}

impl ExecutionError {
    /// Captured stdout and stderr, only present for a failed exit
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionError::Exited { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Run a dump to completion
///
/// `Direct` passes the argument vector to the program and writes its stdout
/// to the artifact. `Shell` hands the plaintext command line to the shell,
/// which performs the redirection itself. A failed dump leaves no artifact.
pub async fn run_dump(
    command: &DumpCommand,
    mode: ExecutionMode,
    timeout: Option<Duration>,
) -> Result<(), ExecutionError> {
    let result = spawn_and_wait(command, mode, timeout).await;
    if result.is_err() {
        remove_partial_artifact(command.output_path());
    }
    result
}

fn remove_partial_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed incomplete backup file {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove incomplete backup file {:?}: {}", path, e),
    }
}

async fn spawn_and_wait(
    command: &DumpCommand,
    mode: ExecutionMode,
    timeout: Option<Duration>,
) -> Result<(), ExecutionError> {
    let (program, mut process) = match mode {
        ExecutionMode::Direct => {
            let path = command.output_path();
            let file = File::create(path).map_err(|source| ExecutionError::OutputFile {
                path: path.to_path_buf(),
                source,
            })?;

            let mut process = tokio::process::Command::new(command.program());
            process.args(command.executable_args());
            process.stdout(Stdio::from(file));
            (command.program().to_string(), process)
        }
        ExecutionMode::Shell => {
            let (shell, flag) = SHELL;
            let mut process = tokio::process::Command::new(shell);
            process.arg(flag).arg(shell_line(command));
            process.stdout(Stdio::piped());
            (shell.to_string(), process)
        }
    };

    process.stdin(Stdio::null());
    process.stderr(Stdio::piped());
    process.kill_on_drop(true);

    debug!("Spawning {} for database '{}'", program, command.database());

    let child = process.spawn().map_err(|source| ExecutionError::Spawn {
        program: program.clone(),
        source,
    })?;

    let wait = child.wait_with_output();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                return Err(ExecutionError::TimedOut {
                    program,
                    after: limit,
                })
            }
        },
        None => wait.await,
    };

    let output = result.map_err(|source| ExecutionError::Wait {
        program: program.clone(),
        source,
    })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);

    Err(ExecutionError::Exited {
        program,
        code: output.status.code(),
        output: String::from_utf8_lossy(&combined).into_owned(),
    })
}
