//! Application event definitions

use super::state::StatusView;
use crate::tray::TrayAction;
use crate::warp::{CancelToken, Mode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use tracing::{info, warn};
use winit::event_loop::EventLoopProxy;

/// Events serviced by the worker, one at a time in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Tray menu action triggered
    TrayAction(TrayAction),
    /// Disconnect, release the lock and stop
    Shutdown,
}

/// Updates sent from the worker to the tray on the main thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayUpdate {
    /// Status item title, icon and connect/disconnect items
    Status(StatusView),
    /// Tick exactly this mode (none for `Mode::Unknown`)
    Mode(Mode),
    /// Worker finished shutting down, leave the event loop
    Exit,
}

/// Destination for tray updates
pub trait TraySink: Send {
    fn apply(&self, update: TrayUpdate);
}

/// Wrapper around `mpsc::Sender<TrayUpdate>` that also wakes the winit event
/// loop so the update is applied without waiting for the next OS event.
#[derive(Clone)]
pub struct TrayUpdateSender {
    tx: mpsc::Sender<TrayUpdate>,
    proxy: EventLoopProxy<()>,
}

impl TrayUpdateSender {
    pub fn new(tx: mpsc::Sender<TrayUpdate>, proxy: EventLoopProxy<()>) -> Self {
        Self { tx, proxy }
    }
}

impl TraySink for TrayUpdateSender {
    fn apply(&self, update: TrayUpdate) {
        if self.tx.send(update).is_err() {
            warn!("Tray is gone, dropping update");
            return;
        }
        let _ = self.proxy.send_event(());
    }
}

/// Triggers shutdown from the menu or a signal handler.
///
/// The first request cancels any status polling in flight, then queues
/// [`AppEvent::Shutdown`] behind whatever the worker is doing. Later requests
/// are ignored.
#[derive(Clone)]
pub struct ShutdownHandle {
    cancel: CancelToken,
    event_tx: mpsc::Sender<AppEvent>,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new(cancel: CancelToken, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            cancel,
            event_tx,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown; returns false if one was already requested
    pub fn request(&self, reason: &str) -> bool {
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!("Shutdown requested: {}", reason);
        self.cancel.cancel();
        if self.event_tx.send(AppEvent::Shutdown).is_err() {
            warn!("Worker already stopped");
        }
        true
    }
}
