//! Worker loop: startup sync, serialized actions, shutdown and the lock

use crate::support::{controller_with, RecordingSink, ScriptedCli};
use std::sync::mpsc;
use warp_tray::error::LockError;
use warp_tray::tray::TrayAction;
use warp_tray::warp::{CancelToken, CliCommand, PollSchedule};
use warp_tray::{run_worker, AppEvent, InstanceLock, Mode, ShutdownHandle, TrayUpdate};

#[test]
fn test_worker_handles_events_in_order_then_shuts_down() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warp-tray.lock");
    let lock = InstanceLock::acquire(&path).unwrap();

    let cli = ScriptedCli::new()
        .settings("Mode: Warp\n")
        .statuses(&["Disconnected", "Connecting", "Connected"]);
    let sink = RecordingSink::default();
    let cancel = CancelToken::new();
    let controller = controller_with(&cli, &sink, PollSchedule::default(), cancel);

    let (event_tx, event_rx) = mpsc::channel();

    // Queued behind the actions, without cancelling their polling
    event_tx.send(AppEvent::TrayAction(TrayAction::Connect)).unwrap();
    event_tx
        .send(AppEvent::TrayAction(TrayAction::SelectMode(Mode::WarpProxy)))
        .unwrap();
    event_tx.send(AppEvent::Shutdown).unwrap();

    run_worker(controller, event_rx, Some(&lock));

    assert_eq!(
        cli.calls(),
        [
            // startup
            CliCommand::Settings,
            CliCommand::Status,
            // connect
            CliCommand::Connect,
            CliCommand::Status,
            CliCommand::Status,
            // mode
            CliCommand::SetMode(Mode::WarpProxy),
            // shutdown
            CliCommand::Disconnect,
        ]
    );
    assert!(!path.exists());
    assert_eq!(sink.last(), Some(TrayUpdate::Exit));
}

#[test]
fn test_shutdown_during_startup_skips_polling() {
    let cli = ScriptedCli::new().settings("Mode: Warp\n");
    let sink = RecordingSink::default();
    let cancel = CancelToken::new();
    let controller = controller_with(&cli, &sink, PollSchedule::default(), cancel.clone());

    let (event_tx, event_rx) = mpsc::channel();
    ShutdownHandle::new(cancel, event_tx).request("signal");

    run_worker(controller, event_rx, None);

    assert_eq!(cli.calls(), [CliCommand::Settings, CliCommand::Disconnect]);
    assert_eq!(cli.count(CliCommand::Disconnect), 1);
}

#[test]
fn test_second_instance_is_refused_until_lock_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warp-tray.lock");
    std::fs::write(&path, b"").unwrap();

    assert!(matches!(
        InstanceLock::acquire(&path),
        Err(LockError::AlreadyRunning(_))
    ));

    std::fs::remove_file(&path).unwrap();
    let lock = InstanceLock::acquire(&path).unwrap();
    assert!(lock.is_held());
}
