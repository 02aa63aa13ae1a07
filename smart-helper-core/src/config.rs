//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/smart-helper/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/smart-helper/` (~/.config/smart-helper/)
//! - Data: `$XDG_DATA_HOME/smart-helper/` (~/.local/share/smart-helper/)
//! - State/Logs: `$XDG_STATE_HOME/smart-helper/` (~/.local/state/smart-helper/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Settings shared by both consoles
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Admin console cadences and seed sizes
    #[serde(default)]
    pub admin: AdminConfig,

    /// Helper console cadences
    #[serde(default)]
    pub helper: HelperConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings shared by every simulated session
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Fixed RNG seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// How often the session runtime advances its clock, in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// How long a notification stays in the feed, in milliseconds
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_ms: default_tick_ms(),
            notification_ttl_ms: default_notification_ttl_ms(),
        }
    }
}

impl SimulationConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

fn default_tick_ms() -> u64 {
    250
}

fn default_notification_ttl_ms() -> u64 {
    3000
}

/// Admin console configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Seconds between synthesized request arrivals
    #[serde(default = "default_admin_arrival_secs")]
    pub arrival_secs: u64,

    /// Seconds between helper status drift rounds
    #[serde(default = "default_drift_secs")]
    pub drift_secs: u64,

    /// Seconds between auto-assignment rounds
    #[serde(default = "default_auto_assign_secs")]
    pub auto_assign_secs: u64,

    /// Per-helper chance of a status reroll on each drift round
    #[serde(default = "default_drift_probability")]
    pub drift_probability: f64,

    /// Per-request chance that a pending request gets assigned
    #[serde(default = "default_assign_probability")]
    pub assign_probability: f64,

    /// Per-request chance that an assigned request completes
    #[serde(default = "default_complete_probability")]
    pub complete_probability: f64,

    /// Requests generated when the console opens
    #[serde(default = "default_initial_requests")]
    pub initial_requests: usize,

    /// Helpers generated when the console opens
    #[serde(default = "default_initial_helpers")]
    pub initial_helpers: usize,

    /// Log entries generated when the console opens
    #[serde(default = "default_initial_logs")]
    pub initial_logs: usize,

    /// Number of most recent log entries retained
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            arrival_secs: default_admin_arrival_secs(),
            drift_secs: default_drift_secs(),
            auto_assign_secs: default_auto_assign_secs(),
            drift_probability: default_drift_probability(),
            assign_probability: default_assign_probability(),
            complete_probability: default_complete_probability(),
            initial_requests: default_initial_requests(),
            initial_helpers: default_initial_helpers(),
            initial_logs: default_initial_logs(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl AdminConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.arrival_secs == 0 || self.drift_secs == 0 || self.auto_assign_secs == 0 {
            return Err(Error::Config(
                "admin cadences must be at least one second".to_string(),
            ));
        }
        for (name, p) in [
            ("drift_probability", self.drift_probability),
            ("assign_probability", self.assign_probability),
            ("complete_probability", self.complete_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Config(format!(
                    "admin.{} must be between 0 and 1",
                    name
                )));
            }
        }
        if self.log_capacity == 0 {
            return Err(Error::Config(
                "admin.log_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_admin_arrival_secs() -> u64 {
    20
}

fn default_drift_secs() -> u64 {
    15
}

fn default_auto_assign_secs() -> u64 {
    10
}

fn default_drift_probability() -> f64 {
    0.3
}

fn default_assign_probability() -> f64 {
    0.15
}

fn default_complete_probability() -> f64 {
    0.1
}

fn default_initial_requests() -> usize {
    8
}

fn default_initial_helpers() -> usize {
    12
}

fn default_initial_logs() -> usize {
    20
}

fn default_log_capacity() -> usize {
    50
}

/// Helper console configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HelperConfig {
    /// Display name of the helper using the console
    #[serde(default = "default_helper_name")]
    pub name: String,

    /// Seconds between incoming request arrivals
    #[serde(default = "default_helper_arrival_secs")]
    pub arrival_secs: u64,

    /// Milliseconds before the initial requests are loaded
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Seconds a request card waits before it is auto-rejected
    #[serde(default = "default_auto_reject_secs")]
    pub auto_reject_secs: u64,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            name: default_helper_name(),
            arrival_secs: default_helper_arrival_secs(),
            initial_delay_ms: default_initial_delay_ms(),
            auto_reject_secs: default_auto_reject_secs(),
        }
    }
}

fn default_helper_name() -> String {
    "Alex Thomas".to_string()
}

fn default_helper_arrival_secs() -> u64 {
    15
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_auto_reject_secs() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.admin.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/smart-helper/config.toml` (~/.config/smart-helper/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("smart-helper").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/smart-helper/` (~/.local/share/smart-helper/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("smart-helper")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/smart-helper/` (~/.local/state/smart-helper/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("smart-helper")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/smart-helper/data.db` (~/.local/share/smart-helper/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/smart-helper/smart-helper.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("smart-helper.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
