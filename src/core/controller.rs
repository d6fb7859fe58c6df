//! Applet controller: runs warp-cli actions and keeps the tray in sync.
//!
//! The controller owns [`AppState`] and lives on the worker thread. Every
//! operation runs to completion before the next event is taken, so two
//! mutating actions never overlap.

use super::events::{AppEvent, TraySink, TrayUpdate};
use super::lock::InstanceLock;
use super::state::{AppState, IconKind, StatusView};
use crate::error::{error_text, StatusError};
use crate::tray::TrayAction;
use crate::warp::{
    reconcile, CancelToken, CliCommand, ConnectionStatus, Mode, PollSchedule, Reconciled, WarpCtl,
};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives warp-cli on behalf of the tray menu
pub struct Controller<C, S> {
    cli: C,
    sink: S,
    state: AppState,
    action_schedule: PollSchedule,
    startup_schedule: PollSchedule,
    cancel: CancelToken,
    pause: fn(Duration),
}

impl<C: WarpCtl, S: TraySink> Controller<C, S> {
    pub fn new(
        cli: C,
        sink: S,
        action_schedule: PollSchedule,
        startup_schedule: PollSchedule,
        cancel: CancelToken,
    ) -> Self {
        Self {
            cli,
            sink,
            state: AppState::new(),
            action_schedule,
            startup_schedule,
            cancel,
            pause: std::thread::sleep,
        }
    }

    /// Replace the function used to wait between status queries
    pub fn with_pause(mut self, pause: fn(Duration)) -> Self {
        self.pause = pause;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Initial sync at launch. The network may still be coming up, so keep
    /// polling while the daemon reports a transition.
    pub fn startup(&mut self) -> Reconciled {
        info!("Syncing with warp-cli");
        self.refresh_mode();
        let schedule = self.startup_schedule;
        self.settle(&schedule)
    }

    /// Dispatch one menu action
    pub fn handle_action(&mut self, action: TrayAction) {
        debug!("Handling {:?}", action);
        match action {
            TrayAction::Connect => self.connect(),
            TrayAction::Disconnect => self.disconnect(),
            TrayAction::SelectMode(mode) => self.change_mode(mode),
            TrayAction::Refresh => self.refresh(),
            // Quit goes through the ShutdownHandle; nothing to do here
            TrayAction::Quit => {}
        }
    }

    pub fn connect(&mut self) {
        if self.run_action(CliCommand::Connect) {
            self.settle_after_action();
        }
    }

    pub fn disconnect(&mut self) {
        if self.run_action(CliCommand::Disconnect) {
            self.settle_after_action();
        }
    }

    /// Switch to `mode`. warp-cli is only invoked when the mode actually
    /// changes; the tick always moves to `mode`, even if the call failed.
    pub fn change_mode(&mut self, mode: Mode) {
        if mode != self.state.mode {
            self.run_action(CliCommand::SetMode(mode));
        } else {
            debug!("Mode {:?} already selected", mode);
        }
        self.set_mode(mode);
    }

    /// Re-read mode and status
    pub fn refresh(&mut self) {
        self.refresh_mode();
        self.settle_after_action();
    }

    /// Disconnect once, then release the instance lock
    pub fn shutdown(&mut self, lock: Option<&InstanceLock>) {
        info!("Shutting down");
        self.run_action(CliCommand::Disconnect);
        if let Some(lock) = lock {
            lock.release();
        }
    }

    /// Query `warp-cli status` and update the tray to match
    pub fn query_status(&mut self) -> ConnectionStatus {
        let status = match self.cli.run(CliCommand::Status) {
            Ok(output) => {
                let status = ConnectionStatus::parse(&output);
                if status == ConnectionStatus::Unknown {
                    warn!("Unrecognized status output: {:?}", output);
                    self.show_error(
                        error_text(&output, &StatusError::Unrecognized),
                        Some(IconKind::Unknown),
                    );
                } else {
                    self.state.error = None;
                    self.show(StatusView::for_status(status));
                }
                status
            }
            Err(e) => {
                self.show_error(error_text(e.output(), &e), None);
                ConnectionStatus::Unknown
            }
        };
        self.state.status = status;
        status
    }

    /// Read the current mode from `warp-cli settings`
    pub fn refresh_mode(&mut self) {
        match self.cli.run(CliCommand::Settings) {
            Ok(output) => {
                let mode = Mode::parse_settings(&output);
                debug!("Mode from settings: {:?}", mode);
                self.set_mode(mode);
            }
            Err(e) => self.show_error(error_text(e.output(), &e), None),
        }
    }

    /// Run a mutating command, reporting failure in the status item
    fn run_action(&mut self, command: CliCommand) -> bool {
        match self.cli.run(command) {
            Ok(_) => {
                info!("warp-cli {} succeeded", command.args().join(" "));
                true
            }
            Err(e) => {
                warn!("warp-cli {} failed: {}", command.args().join(" "), e);
                self.show_error(error_text(e.output(), &e), None);
                false
            }
        }
    }

    fn settle_after_action(&mut self) -> Reconciled {
        let schedule = self.action_schedule;
        self.settle(&schedule)
    }

    fn settle(&mut self, schedule: &PollSchedule) -> Reconciled {
        let cancel = self.cancel.clone();
        let pause = self.pause;
        let result = reconcile(schedule, &cancel, || self.query_status(), pause);

        if let Reconciled::TimedOut { last, waited } = result {
            warn!("Gave up waiting for warp-cli, status still {}", last);
            self.state.status = ConnectionStatus::Unknown;
            self.show_error(
                error_text("", &StatusError::TimedOut { last, waited }),
                Some(IconKind::Unknown),
            );
        }
        result
    }

    fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
        self.sink.apply(TrayUpdate::Mode(mode));
    }

    fn show(&mut self, view: StatusView) {
        self.state.status_text = view.title.clone();
        self.sink.apply(TrayUpdate::Status(view));
    }

    fn show_error(&mut self, text: String, icon: Option<IconKind>) {
        self.state.error = Some(text.clone());
        self.show(StatusView::error(text, icon));
    }
}

/// Worker loop: sync once, then handle events until shutdown.
///
/// The lock is released and the tray told to exit before returning.
pub fn run_worker<C: WarpCtl, S: TraySink>(
    mut controller: Controller<C, S>,
    events: mpsc::Receiver<AppEvent>,
    lock: Option<&InstanceLock>,
) {
    controller.startup();

    while let Ok(event) = events.recv() {
        match event {
            AppEvent::TrayAction(action) => controller.handle_action(action),
            AppEvent::Shutdown => break,
        }
    }

    controller.shutdown(lock);
    controller.sink.apply(TrayUpdate::Exit);
    info!("Worker stopped");
}
