//! Configuration management

use crate::warp::{cli::DEFAULT_PROGRAM, PollSchedule};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// warp-cli configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Path or name of the warp-cli executable
    #[serde(default = "default_program")]
    pub program: String,
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

/// Status polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Wait before the first status query after an action
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Backoff increment between queries
    #[serde(default = "default_step")]
    pub step_ms: u64,
    /// Backoff ceiling
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Give up polling after an action (0 = never)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Fixed wait between queries at launch
    #[serde(default = "default_startup_interval")]
    pub startup_interval_ms: u64,
    /// Give up polling at launch (0 = never)
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
}

fn default_initial_delay() -> u64 {
    200
}
fn default_step() -> u64 {
    100
}
fn default_max_delay() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_startup_interval() -> u64 {
    1000
}
fn default_startup_timeout() -> u64 {
    60
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            step_ms: default_step(),
            max_delay_ms: default_max_delay(),
            timeout_secs: default_timeout(),
            startup_interval_ms: default_startup_interval(),
            startup_timeout_secs: default_startup_timeout(),
        }
    }
}

impl PollingConfig {
    /// Schedule used after connect, disconnect and refresh
    pub fn action_schedule(&self) -> PollSchedule {
        PollSchedule::after_action(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.step_ms),
            Duration::from_millis(self.max_delay_ms),
            secs_or_none(self.timeout_secs),
        )
    }

    /// Schedule used once at launch
    pub fn startup_schedule(&self) -> PollSchedule {
        PollSchedule::startup(
            Duration::from_millis(self.startup_interval_ms),
            secs_or_none(self.startup_timeout_secs),
        )
    }
}

fn secs_or_none(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Single-instance lock configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    /// Sentinel file path
    #[serde(default = "default_lock_path")]
    pub path: PathBuf,
}

fn default_lock_path() -> PathBuf {
    PathBuf::from("/tmp/warp-tray.lock")
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            path: default_lock_path(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// warp-cli configuration
    #[serde(default)]
    pub cli: CliConfig,
    /// Status polling configuration
    #[serde(default)]
    pub polling: PollingConfig,
    /// Single-instance lock configuration
    #[serde(default)]
    pub lock: LockConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `config_path`, defaults if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "warptray", "warp-tray")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Get the default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}
