//! Controller behavior against a scripted warp-cli

use crate::support::{controller, controller_with, RecordingSink, ScriptedCli};
use std::time::Duration;
use warp_tray::core::state::IconKind;
use warp_tray::warp::{CancelToken, CliCommand, PollSchedule, Reconciled};
use warp_tray::{ConnectionStatus, InstanceLock, Mode, TrayUpdate};

#[test]
fn test_connect_polls_until_connected() {
    let cli = ScriptedCli::new().statuses(&[
        "Status update: Connecting",
        "Status update: Connecting",
        "Status update: Connected",
    ]);
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.connect();

    assert_eq!(
        cli.calls(),
        [
            CliCommand::Connect,
            CliCommand::Status,
            CliCommand::Status,
            CliCommand::Status
        ]
    );
    assert_eq!(controller.state().status, ConnectionStatus::Connected);
    assert_eq!(controller.state().error, None);
    assert_eq!(sink.titles(), ["Connecting...", "Connecting...", "Connected!"]);

    match sink.last() {
        Some(TrayUpdate::Status(view)) => {
            assert_eq!(view.icon, Some(IconKind::Connected));
            assert_eq!(view.connect_visible, Some(false));
        }
        other => panic!("unexpected last update: {other:?}"),
    }
}

#[test]
fn test_disconnect_shows_connect_again() {
    let cli = ScriptedCli::new().statuses(&["Disconnecting", "Status update: Disconnected"]);
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.disconnect();

    assert_eq!(cli.count(CliCommand::Status), 2);
    assert_eq!(controller.state().status, ConnectionStatus::Disconnected);
    match sink.last() {
        Some(TrayUpdate::Status(view)) => assert_eq!(view.connect_visible, Some(true)),
        other => panic!("unexpected last update: {other:?}"),
    }
}

#[test]
fn test_failed_connect_is_not_polled() {
    let cli = ScriptedCli::new().failing(CliCommand::Connect, "Error: registration missing");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.connect();

    assert_eq!(cli.calls(), [CliCommand::Connect]);
    assert_eq!(
        controller.state().error.as_deref(),
        Some("ERROR!\nError: registration missing\nexit status 1")
    );
    assert_eq!(controller.state().status_text, controller.state().error.clone().unwrap());
}

#[test]
fn test_unrecognized_status_is_an_error() {
    let cli = ScriptedCli::new().statuses(&["daemon says hello"]);
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    let status = controller.query_status();

    assert_eq!(status, ConnectionStatus::Unknown);
    assert_eq!(
        controller.state().error.as_deref(),
        Some("ERROR!\ndaemon says hello\nStatus: Unknown")
    );
    match sink.last() {
        Some(TrayUpdate::Status(view)) => assert_eq!(view.icon, Some(IconKind::Unknown)),
        other => panic!("unexpected last update: {other:?}"),
    }
}

#[test]
fn test_failed_status_query_reads_as_unknown() {
    let cli = ScriptedCli::new().failing(CliCommand::Status, "IPC error");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    assert_eq!(controller.query_status(), ConnectionStatus::Unknown);
    assert!(controller.state().error.as_deref().unwrap().contains("IPC error"));
}

#[test]
fn test_mode_from_settings() {
    let cli = ScriptedCli::new().settings("Always On: true\nMode: WarpProxy on port 40000\n");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.refresh_mode();

    assert_eq!(controller.state().mode, Mode::WarpProxy);
    assert_eq!(sink.last(), Some(TrayUpdate::Mode(Mode::WarpProxy)));
}

#[test]
fn test_settings_without_mode_unticks_everything() {
    let cli = ScriptedCli::new().settings("Always On: true\n");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.refresh_mode();

    assert_eq!(controller.state().mode, Mode::Unknown);
    assert_eq!(sink.last(), Some(TrayUpdate::Mode(Mode::Unknown)));
}

#[test]
fn test_same_mode_is_noop() {
    let cli = ScriptedCli::new().settings("Mode: Warp\n");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);
    controller.refresh_mode();

    controller.change_mode(Mode::Warp);

    assert_eq!(cli.calls(), [CliCommand::Settings]);
    assert_eq!(controller.state().mode, Mode::Warp);
    assert_eq!(sink.last(), Some(TrayUpdate::Mode(Mode::Warp)));
}

#[test]
fn test_change_mode_invokes_cli() {
    let cli = ScriptedCli::new().settings("Mode: Warp\n");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);
    controller.refresh_mode();

    controller.change_mode(Mode::DnsOverTls);

    assert_eq!(
        cli.calls(),
        [CliCommand::Settings, CliCommand::SetMode(Mode::DnsOverTls)]
    );
    assert_eq!(controller.state().mode, Mode::DnsOverTls);
}

#[test]
fn test_failed_mode_change_still_ticks() {
    let cli = ScriptedCli::new().failing(CliCommand::SetMode(Mode::TunnelOnly), "not allowed");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.change_mode(Mode::TunnelOnly);

    assert_eq!(controller.state().mode, Mode::TunnelOnly);
    assert!(controller.state().error.is_some());
    assert_eq!(sink.last(), Some(TrayUpdate::Mode(Mode::TunnelOnly)));
}

#[test]
fn test_startup_waits_for_network() {
    let cli = ScriptedCli::new()
        .settings("Mode: Warp\n")
        .statuses(&["Status update: Unable\nReason: No Network", "Connected"]);
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    let result = controller.startup();

    assert_eq!(result, Reconciled::Settled(ConnectionStatus::Connected));
    assert_eq!(
        cli.calls(),
        [CliCommand::Settings, CliCommand::Status, CliCommand::Status]
    );
    assert_eq!(sink.titles(), ["No Network", "Connected!"]);
}

#[test]
fn test_refresh_reads_mode_and_status() {
    let cli = ScriptedCli::new()
        .settings("Mode: DnsOverHttps\n")
        .statuses(&["Disconnected"]);
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.refresh();

    assert_eq!(cli.calls(), [CliCommand::Settings, CliCommand::Status]);
    assert_eq!(controller.state().mode, Mode::DnsOverHttps);
    assert_eq!(controller.state().status, ConnectionStatus::Disconnected);
}

#[test]
fn test_timeout_degrades_to_unknown() {
    let cli = ScriptedCli::new().statuses(&["Connecting", "Connecting", "Connecting"]);
    let sink = RecordingSink::default();
    let schedule = PollSchedule::after_action(
        Duration::from_millis(200),
        Duration::from_millis(100),
        Duration::from_secs(2),
        Some(Duration::from_millis(700)),
    );
    let mut controller = controller_with(&cli, &sink, schedule, CancelToken::new());

    controller.connect();

    assert_eq!(cli.count(CliCommand::Status), 3);
    assert_eq!(controller.state().status, ConnectionStatus::Unknown);
    let error = controller.state().error.clone().unwrap();
    assert!(error.starts_with("ERROR!\n"));
    assert!(error.contains("status still Connecting"));
}

#[test]
fn test_cancelled_polling_stops_querying() {
    let cli = ScriptedCli::new();
    let sink = RecordingSink::default();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut controller = controller_with(&cli, &sink, PollSchedule::default(), cancel);

    controller.connect();

    assert_eq!(cli.calls(), [CliCommand::Connect]);
}

#[test]
fn test_shutdown_disconnects_then_releases_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warp-tray.lock");
    let lock = InstanceLock::acquire(&path).unwrap();

    let cli = ScriptedCli::new();
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.shutdown(Some(&lock));

    assert_eq!(cli.calls(), [CliCommand::Disconnect]);
    assert!(!path.exists());
    assert!(!lock.release());
}

#[test]
fn test_shutdown_tolerates_removed_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warp-tray.lock");
    let lock = InstanceLock::acquire(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let cli = ScriptedCli::new().failing(CliCommand::Disconnect, "already disconnected");
    let sink = RecordingSink::default();
    let mut controller = controller(&cli, &sink);

    controller.shutdown(Some(&lock));

    assert_eq!(cli.count(CliCommand::Disconnect), 1);
    assert!(!lock.is_held());
}
