//! Single-instance guard backed by a sentinel file

use crate::error::LockError;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// Sentinel file held for the lifetime of the applet.
///
/// Created with exclusive create, so a second instance sees it and stops.
/// If the file cannot be created for any other reason the applet still runs,
/// unguarded: users are never locked out of their own tray.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    /// Open handle while we own the file, taken on release
    file: Mutex<Option<File>>,
}

impl InstanceLock {
    /// Take the lock at `path`
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                info!("Acquired instance lock {:?}", path);
                Some(file)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::AlreadyRunning(path));
            }
            Err(e) => {
                warn!("Running without instance lock, could not create {:?}: {}", path, e);
                None
            }
        };

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Whether this process created the sentinel file
    pub fn is_held(&self) -> bool {
        self.file.lock().is_some()
    }

    /// Close and remove the sentinel file.
    ///
    /// Returns true only for the call that actually released it. A file
    /// already removed by someone else is not an error.
    pub fn release(&self) -> bool {
        let Some(file) = self.file.lock().take() else {
            return false;
        };
        drop(file);

        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Released instance lock {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Instance lock {:?} was already removed", self.path)
            }
            Err(e) => warn!("Could not remove lock file {:?}: {}", self.path, e),
        }
        true
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}
