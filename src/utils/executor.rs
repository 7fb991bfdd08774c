//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for running dumps,
//! enabling dependency injection and mocking for tests.

use super::command::{run_dump, ExecutionError};
use super::dump::DumpCommand;
use crate::config::{ExecutionMode, Settings};
use std::io;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Abstraction for dump execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run the dump to completion, creating or overwriting its artifact
    fn execute(&self, command: &DumpCommand) -> Result<(), ExecutionError>;
}

/// Default implementation using real subprocess calls
///
/// Owns a current-thread runtime used only to bound each dump by the
/// timeout; calls block until the subprocess is gone.
pub struct RealExecutor {
    mode: ExecutionMode,
    timeout: Option<Duration>,
    runtime: Runtime,
}

impl RealExecutor {
    pub fn new(mode: ExecutionMode, timeout: Option<Duration>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            mode,
            timeout,
            runtime,
        })
    }

    pub fn from_settings(settings: &Settings) -> io::Result<Self> {
        let timeout = match settings.timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };
        Self::new(settings.execution, timeout)
    }
}

impl CommandExecutor for RealExecutor {
    fn execute(&self, command: &DumpCommand) -> Result<(), ExecutionError> {
        self.runtime
            .block_on(run_dump(command, self.mode, self.timeout))
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Recorded dump invocation
    #[derive(Clone, Debug)]
    pub struct ExecutedCommand {
        pub program: String,
        pub database: String,
        pub args: Vec<String>,
        pub executable_line: String,
        pub loggable_line: String,
        pub output_path: PathBuf,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug, Default)]
    pub enum MockResponse {
        #[default]
        Success,
        Failure {
            output: String,
            exit_code: i32,
        },
        SpawnError,
        Timeout,
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded invocations
        pub calls: Arc<Mutex<Vec<ExecutedCommand>>>,
        /// Pre-configured responses: database name -> response
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific database
        pub fn expect(self, database: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(database.to_string(), response);
            self
        }

        /// Set the default response for unconfigured databases
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ExecutedCommand> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a database was dumped
        pub fn was_called(&self, database: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.database == database)
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record_call(&self, command: &DumpCommand) {
            self.calls.lock().unwrap().push(ExecutedCommand {
                program: command.program().to_string(),
                database: command.database().to_string(),
                args: command.executable_args(),
                executable_line: command.executable_line(),
                loggable_line: command.loggable_line(),
                output_path: command.output_path().to_path_buf(),
            });
        }

        fn get_response(&self, database: &str) -> MockResponse {
            self.responses
                .lock()
                .unwrap()
                .get(database)
                .cloned()
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
        }
    }

    impl CommandExecutor for MockExecutor {
        fn execute(&self, command: &DumpCommand) -> Result<(), ExecutionError> {
            self.record_call(command);

            match self.get_response(command.database()) {
                MockResponse::Success => Ok(()),
                MockResponse::Failure { output, exit_code } => Err(ExecutionError::Exited {
                    program: command.program().to_string(),
                    code: Some(exit_code),
                    output,
                }),
                MockResponse::SpawnError => Err(ExecutionError::Spawn {
                    program: command.program().to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
                }),
                MockResponse::Timeout => Err(ExecutionError::TimedOut {
                    program: command.program().to_string(),
                    after: Duration::from_secs(1),
                }),
            }
        }
    }
}
