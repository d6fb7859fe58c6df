//! warp-tray - Entry Point
//!
//! Parses the command line, then either manages launcher files or runs the
//! tray applet: tray on the main thread, warp-cli worker and signal
//! listener on their own threads.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warp_tray::{
    core::events::TrayUpdateSender,
    launcher::{self, LauncherPaths},
    run_worker,
    tray::TrayManager,
    warp::{CancelToken, WarpCli},
    AppEvent, Config, Controller, InstanceLock, ShutdownHandle, TrayUpdate,
};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::WindowId,
};

/// How often GTK gets pumped on Linux while the event loop is idle
#[cfg(target_os = "linux")]
const GTK_PUMP_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);

/// Exit status when a repeated signal cuts the graceful shutdown short
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "warp-tray", about = "Tray applet for warp-cli (Cloudflare WARP)")]
struct Cli {
    /// Create a desktop launcher and its icon
    #[arg(long)]
    create_launcher: bool,

    /// Start the applet on login
    #[arg(long)]
    autostart: bool,

    /// Remove launcher, icon, autostart and lock files
    #[arg(long, conflicts_with_all = ["create_launcher", "autostart"])]
    cleanup: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.create_launcher || cli.autostart {
        return install_entries(cli.create_launcher, cli.autostart);
    }

    if cli.cleanup {
        let paths = LauncherPaths::for_user()?;
        for entry in launcher::cleanup(&paths, &config.lock.path) {
            println!("{}", entry);
        }
        return Ok(());
    }

    run_applet(config)
}

fn install_entries(create_launcher: bool, autostart: bool) -> Result<()> {
    let exec_path = launcher::which_executable()?;
    info!("Which executable: {:?}", exec_path);

    let paths = LauncherPaths::for_user()?;
    if create_launcher {
        launcher::create_launcher(&paths, &exec_path)?;
    }
    if autostart {
        launcher::enable_autostart(&paths, &exec_path)?;
    }
    Ok(())
}

fn run_applet(config: Config) -> Result<()> {
    let lock = match InstanceLock::acquire(&config.lock.path) {
        Ok(lock) => Arc::new(lock),
        Err(e) => {
            // Another instance owns the tray; leave quietly
            println!("{}", e);
            return Ok(());
        }
    };

    info!("Starting warp-tray (warp-cli: {})", config.cli.program);

    #[cfg(target_os = "linux")]
    gtk::init().context("Failed to initialize GTK")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let (update_tx, update_rx) = mpsc::channel::<TrayUpdate>();

    let cancel = CancelToken::new();
    let shutdown = ShutdownHandle::new(cancel.clone(), event_tx.clone());

    // Tray must be created on the main thread
    let tray = TrayManager::new(event_tx, shutdown.clone())?;

    let controller = Controller::new(
        WarpCli::new(config.cli.program.clone()),
        TrayUpdateSender::new(update_tx, event_loop.create_proxy()),
        config.polling.action_schedule(),
        config.polling.startup_schedule(),
        cancel,
    );

    let worker_lock = Arc::clone(&lock);
    let worker = std::thread::Builder::new()
        .name("warp-worker".to_string())
        .spawn(move || run_worker(controller, event_rx, Some(worker_lock.as_ref())))
        .context("Failed to spawn worker thread")?;

    spawn_signal_listener(shutdown.clone(), Arc::clone(&lock));

    let mut app = TrayApp { tray, update_rx };
    let run_result = event_loop.run_app(&mut app);

    // Covers the event loop ending on its own
    shutdown.request("event loop exited");
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }
    lock.release();

    run_result.context("Event loop failed")?;
    info!("warp-tray exiting");
    Ok(())
}

/// Listen for Ctrl+C or SIGTERM on a small tokio runtime. The first signal
/// requests a graceful shutdown; another one while that is still running
/// (say warp-cli hangs) removes the lock file and exits immediately.
fn spawn_signal_listener(shutdown: ShutdownHandle, lock: Arc<InstanceLock>) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create signal runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            loop {
                wait_for_signal().await;
                if !shutdown.request("termination signal") {
                    break;
                }
            }
        });

        warn!("Signal received again during shutdown, exiting now");
        lock.release();
        std::process::exit(FORCED_EXIT_CODE);
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            None
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Received Ctrl+C"),
            Err(e) => {
                warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        },
        Some(_) = async {
            match terminate.as_mut() {
                Some(stream) => stream.recv().await,
                None => std::future::pending().await,
            }
        } => info!("Received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// winit handler on the main thread: applies worker updates to the tray
struct TrayApp {
    tray: TrayManager,
    update_rx: mpsc::Receiver<TrayUpdate>,
}

impl ApplicationHandler for TrayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, _event: WindowEvent) {}

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Process tray updates from the worker (non-blocking)
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                TrayUpdate::Status(view) => self.tray.set_status(&view),
                TrayUpdate::Mode(mode) => self.tray.set_mode(mode),
                TrayUpdate::Exit => {
                    info!("Worker finished, leaving event loop");
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            while gtk::events_pending() {
                gtk::main_iteration();
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(
                std::time::Instant::now() + GTK_PUMP_INTERVAL,
            ));
        }
    }
}
