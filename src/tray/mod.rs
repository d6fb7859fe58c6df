//! Tray module - System tray icon and menu

pub mod icon;
mod menu;

pub use icon::TrayIcon;
pub use menu::{MenuIds, TrayAction, TrayManager};
