//! Gateway to the `warp-cli` executable

use super::Mode;
use crate::error::CliError;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Default executable name, resolved through `PATH`
pub const DEFAULT_PROGRAM: &str = "warp-cli";

/// Subcommands the applet issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    Connect,
    Disconnect,
    SetMode(Mode),
    Status,
    Settings,
}

impl CliCommand {
    /// Command line arguments for this subcommand
    pub fn args(&self) -> Vec<&'static str> {
        match self {
            CliCommand::Connect => vec!["connect"],
            CliCommand::Disconnect => vec!["disconnect"],
            CliCommand::SetMode(mode) => vec!["mode", mode.cli_arg()],
            CliCommand::Status => vec!["status"],
            CliCommand::Settings => vec!["settings"],
        }
    }
}

/// Something that can run warp-cli subcommands.
///
/// Calls block until the process exits. Implementations never retry.
pub trait WarpCtl: Send {
    /// Run `command`, returning merged stdout + stderr on success
    fn run(&self, command: CliCommand) -> Result<String, CliError>;
}

/// Runs the real executable as a subprocess
#[derive(Debug, Clone)]
pub struct WarpCli {
    program: String,
}

impl WarpCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for WarpCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl WarpCtl for WarpCli {
    fn run(&self, command: CliCommand) -> Result<String, CliError> {
        let args = command.args();
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                warn!("Failed to spawn {}: {}", self.program, source);
                CliError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        // Buffer is owned by this invocation
        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(captured)
        } else {
            warn!(
                "{} {} exited with {}",
                self.program,
                args.join(" "),
                output.status
            );
            Err(CliError::Failed {
                code: output.status.code(),
                output: captured,
            })
        }
    }
}
