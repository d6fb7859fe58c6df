//! Application state and how it maps onto the tray

use crate::warp::{ConnectionStatus, Mode};

/// Which tray icon to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Connected,
    Disconnected,
    Unknown,
}

/// What the tray should show for a status change.
///
/// `None` fields leave the current tray state as it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Status item title
    pub title: String,
    /// Icon to switch to
    pub icon: Option<IconKind>,
    /// Show "Connect" (and hide "Disconnect") when true, the reverse when false
    pub connect_visible: Option<bool>,
}

impl StatusView {
    /// View for a successfully parsed status. `Unknown` is always reported
    /// through [`StatusView::error`] instead.
    pub fn for_status(status: ConnectionStatus) -> Self {
        let (title, icon, connect_visible) = match status {
            ConnectionStatus::Connecting => ("Connecting...", None, None),
            ConnectionStatus::Disconnecting => ("Disconnecting...", None, None),
            ConnectionStatus::Connected => ("Connected!", Some(IconKind::Connected), Some(false)),
            ConnectionStatus::Disconnected => {
                ("Disconnected!", Some(IconKind::Disconnected), Some(true))
            }
            ConnectionStatus::NoNetwork => ("No Network", Some(IconKind::Disconnected), Some(true)),
            ConnectionStatus::Unknown => ("Unknown", Some(IconKind::Unknown), None),
        };
        Self {
            title: title.to_string(),
            icon,
            connect_visible,
        }
    }

    /// Error text in the status item, optionally switching the icon
    pub fn error(text: String, icon: Option<IconKind>) -> Self {
        Self {
            title: text,
            icon,
            connect_visible: None,
        }
    }
}

/// State owned by the worker's controller
#[derive(Debug, Default)]
pub struct AppState {
    /// Last status observed
    pub status: ConnectionStatus,
    /// Mode whose checkbox is ticked (`Unknown` = none)
    pub mode: Mode,
    /// Text currently shown in the status item
    pub status_text: String,
    /// Last error shown, if the most recent operation failed
    pub error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            status_text: "Initializing...".to_string(),
            ..Self::default()
        }
    }
}
