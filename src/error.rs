//! Error types surfaced by the warp-cli gateway, the status poller and the
//! single-instance lock.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::warp::ConnectionStatus;

/// Failure to run a warp-cli subcommand
#[derive(Debug, Error)]
pub enum CliError {
    /// The executable could not be started at all
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The executable ran and exited unsuccessfully
    #[error("{}", describe_exit(.code))]
    Failed {
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Merged stdout + stderr of the failed invocation
        output: String,
    },
}

impl CliError {
    /// Captured output of the invocation (empty if it never started)
    pub fn output(&self) -> &str {
        match self {
            CliError::Spawn { .. } => "",
            CliError::Failed { output, .. } => output,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Status could not be resolved to something the menu can show
#[derive(Debug, Error)]
pub enum StatusError {
    /// `warp-cli status` printed none of the known markers
    #[error("Status: Unknown")]
    Unrecognized,

    /// Polling gave up while the daemon was still transitioning
    #[error("status still {last} after waiting {waited:?}")]
    TimedOut {
        last: ConnectionStatus,
        waited: Duration,
    },
}

/// Single-instance lock errors
#[derive(Debug, Error)]
pub enum LockError {
    /// The sentinel file exists, another instance owns it
    #[error("warp-tray is already running, lock file exists: {0:?}")]
    AlreadyRunning(PathBuf),
}

/// Text shown in the status menu item when something went wrong
pub fn error_text(output: &str, err: &dyn std::fmt::Display) -> String {
    format!("ERROR!\n{}\n{}", output, err)
}
