//! Scripted warp-cli and a recording tray sink

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use warp_tray::error::CliError;
use warp_tray::warp::{CancelToken, CliCommand, PollSchedule, WarpCtl};
use warp_tray::{Controller, TraySink, TrayUpdate};

#[derive(Default)]
struct Script {
    status: VecDeque<Result<String, CliError>>,
    settings: Option<String>,
    failing: Vec<(CliCommand, String)>,
    calls: Vec<CliCommand>,
}

/// Fake gateway answering from a script and recording every call
#[derive(Clone, Default)]
pub struct ScriptedCli {
    script: Arc<Mutex<Script>>,
}

impl ScriptedCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `status` outputs, answered in order
    pub fn statuses(self, outputs: &[&str]) -> Self {
        self.script
            .lock()
            .status
            .extend(outputs.iter().map(|s| Ok(s.to_string())));
        self
    }

    pub fn settings(self, output: &str) -> Self {
        self.script.lock().settings = Some(output.to_string());
        self
    }

    /// Make `command` exit 1 with `output`
    pub fn failing(self, command: CliCommand, output: &str) -> Self {
        self.script
            .lock()
            .failing
            .push((command, output.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<CliCommand> {
        self.script.lock().calls.clone()
    }

    pub fn count(&self, command: CliCommand) -> usize {
        self.calls().iter().filter(|c| **c == command).count()
    }
}

impl WarpCtl for ScriptedCli {
    fn run(&self, command: CliCommand) -> Result<String, CliError> {
        let mut script = self.script.lock();
        script.calls.push(command);

        if let Some((_, output)) = script.failing.iter().find(|(c, _)| *c == command) {
            return Err(CliError::Failed {
                code: Some(1),
                output: output.clone(),
            });
        }

        match command {
            CliCommand::Status => script
                .status
                .pop_front()
                .unwrap_or_else(|| panic!("status queried more often than scripted")),
            CliCommand::Settings => Ok(script.settings.clone().unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }
}

/// Sink that keeps every update
#[derive(Clone, Default)]
pub struct RecordingSink {
    updates: Arc<Mutex<Vec<TrayUpdate>>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<TrayUpdate> {
        self.updates.lock().clone()
    }

    pub fn last(&self) -> Option<TrayUpdate> {
        self.updates.lock().last().cloned()
    }

    /// Titles of every status update, in order
    pub fn titles(&self) -> Vec<String> {
        self.updates()
            .into_iter()
            .filter_map(|u| match u {
                TrayUpdate::Status(view) => Some(view.title),
                _ => None,
            })
            .collect()
    }
}

impl TraySink for RecordingSink {
    fn apply(&self, update: TrayUpdate) {
        self.updates.lock().push(update);
    }
}

fn no_wait(_: Duration) {}

/// Controller over `cli` that never actually sleeps
pub fn controller(cli: &ScriptedCli, sink: &RecordingSink) -> Controller<ScriptedCli, RecordingSink> {
    controller_with(cli, sink, PollSchedule::default(), CancelToken::new())
}

pub fn controller_with(
    cli: &ScriptedCli,
    sink: &RecordingSink,
    schedule: PollSchedule,
    cancel: CancelToken,
) -> Controller<ScriptedCli, RecordingSink> {
    Controller::new(
        cli.clone(),
        sink.clone(),
        schedule,
        PollSchedule::startup(Duration::from_secs(1), Some(Duration::from_secs(60))),
        cancel,
    )
    .with_pause(no_wait)
}
