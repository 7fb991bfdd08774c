use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use softbackup::config::{self, Config};
use softbackup::managers::logging::{self, LoggingConfig};
use softbackup::utils::{AgeVault, CredentialVault, RealExecutor, RunLock, UnavailableVault};
use softbackup::BackupManager;
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::{error, warn};

/// Config file missing, unreadable or invalid
const EXIT_CONFIG: u8 = 1;
/// Log file could not be opened
const EXIT_LOG: u8 = 2;
/// Another run holds the lock
const EXIT_LOCKED: u8 = 3;
/// The subprocess runtime could not be started
const EXIT_RUNTIME: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "softbackup")]
#[command(about = "Dump the configured MySQL databases with mysqldump", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version information and exit
    #[arg(short = 'v', long = "version")]
    version: bool,
}

fn main() -> ExitCode {
    // `-version` is accepted as a spelling of `--version`
    let args = std::env::args_os().map(|arg| {
        if arg.to_str() == Some("-version") {
            OsString::from("--version")
        } else {
            arg
        }
    });

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::SUCCESS;
        }
    };

    if cli.version {
        println!("SoftBackup - {}", softbackup::VERSION);
        return ExitCode::SUCCESS;
    }

    run()
}

fn run() -> ExitCode {
    let config_path = config::config_path();
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to open config file! ('{}')", config_path.display());
            eprintln!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // Setup logging (must keep guard alive)
    let logging_config = LoggingConfig::from_config(&config.paths.log, &config.settings.log_level);
    let _log_guard = match logging::init_logging(&logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!(
                "Failed to open log file! ('{}')",
                logging_config.log_file().display()
            );
            eprintln!("{}", e);
            return ExitCode::from(EXIT_LOG);
        }
    };

    let mut lock = match RunLock::in_directory(&config.paths.log) {
        Ok(lock) => lock,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_LOCKED);
        }
    };
    let _run_guard = match lock.try_acquire() {
        Ok(guard) => guard,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_LOCKED);
        }
    };

    if let Err(e) = which::which(&config.settings.dump_program) {
        warn!(
            "'{}' was not found on PATH ({}), dumps will fail",
            config.settings.dump_program, e
        );
    }

    let executor = match RealExecutor::from_settings(&config.settings) {
        Ok(executor) => executor,
        Err(e) => {
            error!("Failed to set up the command runner: {}", e);
            return ExitCode::from(EXIT_RUNTIME);
        }
    };
    let vault = load_vault(&config);

    let manager = BackupManager::new(&config, vault.as_ref(), &executor);
    let report = manager.run();

    if report.failed() > 0 {
        warn!(
            "{} of {} databases failed, see {}",
            report.failed(),
            report.outcomes.len(),
            logging_config.log_file().display()
        );
    }

    // Per-database failures are reported in the log, not in the exit code
    ExitCode::SUCCESS
}

/// Build the vault; without one only password-less targets can run
fn load_vault(config: &Config) -> Box<dyn CredentialVault> {
    match &config.vault {
        Some(vault) => match AgeVault::from_passphrase_file(&vault.passphrase_file) {
            Ok(vault) => Box::new(vault),
            Err(e) => {
                error!("{}", e);
                Box::new(UnavailableVault::new(e.to_string()))
            }
        },
        None => Box::new(UnavailableVault::new(
            "no [vault] section in the configuration",
        )),
    }
}
