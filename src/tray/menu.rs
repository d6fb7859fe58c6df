//! Tray menu management

use super::icon::TrayIcon;
use crate::core::events::{AppEvent, ShutdownHandle};
use crate::core::state::StatusView;
use crate::warp::Mode;
use anyhow::{Context, Result};
use std::sync::mpsc;
use tracing::{debug, error, info};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu},
    TrayIcon as TrayIconHandle, TrayIconBuilder,
};

/// Position of the Connect / Disconnect slot (after status and separator)
const CONNECT_SLOT: usize = 2;

const TOOLTIP: &str = "Cloudflare WARP";

/// Tray menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// Bring the tunnel up
    Connect,
    /// Bring the tunnel down
    Disconnect,
    /// Switch operating mode
    SelectMode(Mode),
    /// Re-read mode and status
    Refresh,
    /// Quit application
    Quit,
}

/// Menu item IDs and the action each one triggers
#[derive(Debug, Clone)]
pub struct MenuIds {
    pub connect: MenuId,
    pub disconnect: MenuId,
    pub modes: Vec<(MenuId, Mode)>,
    pub refresh: MenuId,
    pub quit: MenuId,
}

impl MenuIds {
    pub fn action_for(&self, id: &MenuId) -> Option<TrayAction> {
        if *id == self.connect {
            Some(TrayAction::Connect)
        } else if *id == self.disconnect {
            Some(TrayAction::Disconnect)
        } else if *id == self.refresh {
            Some(TrayAction::Refresh)
        } else if *id == self.quit {
            Some(TrayAction::Quit)
        } else {
            self.modes
                .iter()
                .find(|(mode_id, _)| mode_id == id)
                .map(|(_, mode)| TrayAction::SelectMode(*mode))
        }
    }
}

/// Tray manager. Lives on the main thread; tray handles are not `Send`.
pub struct TrayManager {
    /// Tray icon handle
    tray: TrayIconHandle,
    /// Icons for each connection state
    icons: TrayIcon,
    menu: Menu,
    status_item: MenuItem,
    connect_item: MenuItem,
    disconnect_item: MenuItem,
    mode_items: Vec<(Mode, CheckMenuItem)>,
    /// Whether the Connect item currently occupies the slot
    connect_shown: bool,
}

impl TrayManager {
    /// Create a new tray manager and start forwarding menu clicks.
    ///
    /// Quit goes to `shutdown`; everything else is queued on `event_tx`.
    pub fn new(event_tx: mpsc::Sender<AppEvent>, shutdown: ShutdownHandle) -> Result<Self> {
        // Load icons
        let icons = TrayIcon::new().context("Failed to load tray icons")?;

        // Create menu
        let menu = Menu::new();

        let status_item = MenuItem::new("Initializing...", false, None);
        let connect_item = MenuItem::new("Connect", true, None);
        let disconnect_item = MenuItem::new("Disconnect", true, None);

        let mode_menu = Submenu::new("Mode", true);
        let mut mode_items = Vec::with_capacity(Mode::ALL.len());
        for mode in Mode::ALL {
            let item = CheckMenuItem::new(format!("  {}", mode.label()), true, false, None);
            mode_menu.append(&item)?;
            mode_items.push((mode, item));
        }

        let refresh_item = MenuItem::new("Refresh", true, None);
        let quit_item = MenuItem::new("Quit", true, None);

        // Disconnect is inserted in place of Connect once connected
        menu.append(&status_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&connect_item)?;
        menu.append(&mode_menu)?;
        menu.append(&refresh_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&quit_item)?;

        let ids = MenuIds {
            connect: connect_item.id().clone(),
            disconnect: disconnect_item.id().clone(),
            modes: mode_items
                .iter()
                .map(|(mode, item)| (item.id().clone(), *mode))
                .collect(),
            refresh: refresh_item.id().clone(),
            quit: quit_item.id().clone(),
        };

        // Create tray icon
        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu.clone()))
            .with_tooltip(TOOLTIP)
            .with_icon(icons.disconnected.clone())
            .build()
            .context("Failed to create tray icon")?;

        info!("Tray icon created");

        start_menu_handler(ids, event_tx, shutdown);

        Ok(Self {
            tray,
            icons,
            menu,
            status_item,
            connect_item,
            disconnect_item,
            mode_items,
            connect_shown: true,
        })
    }

    /// Show a status change
    pub fn set_status(&mut self, view: &StatusView) {
        self.status_item.set_text(&view.title);

        if let Some(kind) = view.icon {
            if let Err(e) = self.tray.set_icon(Some(self.icons.get(kind).clone())) {
                error!("Failed to set tray icon: {}", e);
            }
        }

        if let Some(show_connect) = view.connect_visible {
            if let Err(e) = self.show_connect(show_connect) {
                error!("Failed to swap connect/disconnect items: {}", e);
            }
        }
    }

    /// Tick `mode` and untick everything else
    pub fn set_mode(&mut self, mode: Mode) {
        for (item_mode, item) in &self.mode_items {
            item.set_checked(*item_mode == mode);
        }
    }

    fn show_connect(&mut self, show_connect: bool) -> Result<()> {
        if show_connect == self.connect_shown {
            return Ok(());
        }
        let (hide, show) = if show_connect {
            (&self.disconnect_item, &self.connect_item)
        } else {
            (&self.connect_item, &self.disconnect_item)
        };
        self.menu.remove(hide)?;
        self.menu.insert(show, CONNECT_SLOT)?;
        self.connect_shown = show_connect;
        Ok(())
    }
}

/// Start menu event handler
fn start_menu_handler(ids: MenuIds, event_tx: mpsc::Sender<AppEvent>, shutdown: ShutdownHandle) {
    std::thread::spawn(move || {
        let receiver = MenuEvent::receiver();

        while let Ok(event) = receiver.recv() {
            debug!("Menu event: {:?}", event);

            match ids.action_for(&event.id) {
                Some(TrayAction::Quit) => {
                    shutdown.request("quit selected from tray");
                }
                Some(action) => {
                    if let Err(e) = event_tx.send(AppEvent::TrayAction(action)) {
                        error!("Failed to send tray action: {}", e);
                        break;
                    }
                }
                None => {}
            }
        }
    });
}
