//! Desktop launcher and autostart entries (freedesktop `.desktop` files)

use crate::core::state::IconKind;
use crate::tray::icon::{encode_png, LAUNCHER_ICON_SIZE};
use anyhow::{Context, Result};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_NAME: &str = "Cloudflare WARP Tray";
const FILE_STEM: &str = "warp-tray";

/// Where launcher files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    /// `<data>/applications/warp-tray.desktop`
    pub launcher: PathBuf,
    /// `<data>/icons/warp-tray.png`
    pub icon: PathBuf,
    /// `<config>/autostart/warp-tray.desktop`
    pub autostart: PathBuf,
}

impl LauncherPaths {
    /// Paths under the given data and config directories
    pub fn under(data_dir: &Path, config_dir: &Path) -> Self {
        Self {
            launcher: data_dir
                .join("applications")
                .join(format!("{FILE_STEM}.desktop")),
            icon: data_dir.join("icons").join(format!("{FILE_STEM}.png")),
            autostart: config_dir
                .join("autostart")
                .join(format!("{FILE_STEM}.desktop")),
        }
    }

    /// Paths for the current user (`~/.local/share`, `~/.config` on Linux)
    pub fn for_user() -> Result<Self> {
        let data_dir = dirs::data_dir().context("Failed to determine data directory")?;
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(Self::under(&data_dir, &config_dir))
    }
}

/// Desktop entry for the application menu
pub fn launcher_entry(exec_path: &Path, icon_path: &Path) -> String {
    format!(
        "[Desktop Entry]\nName={}\nType=Application\nExec={}\nIcon={}\n",
        APP_NAME,
        exec_path.display(),
        icon_path.display()
    )
}

/// Desktop entry started on login
pub fn autostart_entry(exec_path: &Path) -> String {
    format!(
        "[Desktop Entry]\nName={}\nType=Application\nExec={}\nX-GNOME-Autostart-enabled=true\n",
        APP_NAME,
        exec_path.display()
    )
}

/// Write the application launcher and its icon
pub fn create_launcher(paths: &LauncherPaths, exec_path: &Path) -> Result<()> {
    write_file(&paths.launcher, launcher_entry(exec_path, &paths.icon).as_bytes())
        .context("Could not create launcher file")?;
    info!("Launcher file is created: {:?}", paths.launcher);

    let icon = encode_png(IconKind::Connected, LAUNCHER_ICON_SIZE)?;
    write_file(&paths.icon, &icon).context("Could not create launcher icon file")?;
    info!("Launcher icon file is created: {:?}", paths.icon);

    Ok(())
}

/// Write the autostart entry
pub fn enable_autostart(paths: &LauncherPaths, exec_path: &Path) -> Result<()> {
    write_file(&paths.autostart, autostart_entry(exec_path).as_bytes())
        .context("Could not create autostart file")?;
    info!("Autostart file is created: {:?}", paths.autostart);
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

/// Result of removing one file during cleanup
#[derive(Debug)]
pub enum Removal {
    Removed,
    NotPresent,
    Failed(io::Error),
}

/// One cleanup step
#[derive(Debug)]
pub struct CleanupEntry {
    pub what: &'static str,
    pub path: PathBuf,
    pub outcome: Removal,
}

impl fmt::Display for CleanupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Removal::Removed => write!(f, "{} is removed: {:?}", self.what, self.path),
            Removal::NotPresent => write!(f, "{} not present: {:?}", self.what, self.path),
            Removal::Failed(e) => {
                write!(f, "could not remove {} {:?}: {}", self.what, self.path, e)
            }
        }
    }
}

/// Remove every file the applet may have created. Missing files are fine;
/// every step runs even if an earlier one fails.
pub fn cleanup(paths: &LauncherPaths, lock_path: &Path) -> Vec<CleanupEntry> {
    let targets = [
        ("Launcher file", paths.launcher.as_path()),
        ("Launcher icon file", paths.icon.as_path()),
        ("Autostart file", paths.autostart.as_path()),
        ("Lock file", lock_path),
    ];

    targets
        .into_iter()
        .map(|(what, path)| CleanupEntry {
            what,
            path: path.to_path_buf(),
            outcome: remove(path),
        })
        .collect()
}

fn remove(path: &Path) -> Removal {
    match std::fs::remove_file(path) {
        Ok(()) => Removal::Removed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Removal::NotPresent,
        Err(e) => Removal::Failed(e),
    }
}

/// Absolute path of the installed `warp-tray`, falling back to this
/// executable with symlinks resolved
pub fn which_executable() -> Result<PathBuf> {
    match which::which(FILE_STEM) {
        Ok(found) => {
            debug!("Found {} in PATH: {:?}", FILE_STEM, found);
            return Ok(found);
        }
        Err(e) => debug!("{} not in PATH: {}", FILE_STEM, e),
    }

    let exe = std::env::current_exe().context("Could not get executable path")?;
    exe.canonicalize()
        .with_context(|| format!("Could not resolve executable path {:?}", exe))
}
