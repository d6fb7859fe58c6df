//! Cloudflare WARP tray applet
//!
//! A tray front-end for `warp-cli`: shows connection status and lets the
//! user connect, disconnect and switch modes from the menu.
//!
//! # Features
//! - Status polling with backoff while the daemon changes state
//! - Mode selection (DoH, DoT, WARP, proxy, tunnel only)
//! - Single running instance via a lock file
//! - Desktop launcher and autostart entries

pub mod core;
pub mod error;
pub mod launcher;
pub mod tray;
pub mod warp;

pub use core::config::Config;
pub use core::controller::{run_worker, Controller};
pub use core::events::{AppEvent, ShutdownHandle, TraySink, TrayUpdate};
pub use core::lock::InstanceLock;
pub use core::state::AppState;
pub use warp::{ConnectionStatus, Mode};
