//! User settings for dockhand
//!
//! Located at `$XDG_CONFIG_HOME/dockhand/config.yml`, falling back to
//! `~/.config/dockhand/config.yml`.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Number of columns in the container table
pub const COLUMN_COUNT: usize = 9;

/// Default column width percentages, in table order
pub const DEFAULT_COLUMN_PERCENTS: [u16; COLUMN_COUNT] = [8, 14, 6, 6, 10, 12, 18, 13, 13];

/// Shell used when none is configured
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Shells offered by the settings editor
pub const SHELL_OPTIONS: [&str; 4] = ["/bin/sh", "/bin/bash", "/bin/zsh", "/bin/ash"];

pub const MIN_POLL_RATE: u64 = 1;
pub const MAX_POLL_RATE: u64 = 300;

const APP_DIR: &str = "dockhand";
const CONFIG_FILE: &str = "config.yml";

/// Container runtime backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    #[default]
    Docker,
    Podman,
}

impl RuntimeKind {
    /// Name of the CLI binary for this runtime
    pub fn binary(&self) -> &'static str {
        match self {
            RuntimeKind::Docker => "docker",
            RuntimeKind::Podman => "podman",
        }
    }

    /// The other backend
    pub fn toggled(&self) -> RuntimeKind {
        match self {
            RuntimeKind::Docker => RuntimeKind::Podman,
            RuntimeKind::Podman => RuntimeKind::Docker,
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for RuntimeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "docker" => Ok(RuntimeKind::Docker),
            "podman" => Ok(RuntimeKind::Podman),
            other => Err(ConfigError::UnknownRuntime(other.to_string())),
        }
    }
}

/// All persisted settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub performance: PerformanceConfig,
    pub runtime: RuntimeConfig,
    pub exec: ExecConfig,
}

/// Column width percentages, one per table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub container_id_width: u16,
    pub container_name_width: u16,
    pub memory_width: u16,
    pub cpu_width: u16,
    pub net_io_width: u16,
    pub disk_io_width: u16,
    pub image_width: u16,
    pub status_width: u16,
    pub port_width: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::from_percents(DEFAULT_COLUMN_PERCENTS)
    }
}

impl LayoutConfig {
    pub fn from_percents(p: [u16; COLUMN_COUNT]) -> Self {
        Self {
            container_id_width: p[0],
            container_name_width: p[1],
            memory_width: p[2],
            cpu_width: p[3],
            net_io_width: p[4],
            disk_io_width: p[5],
            image_width: p[6],
            status_width: p[7],
            port_width: p[8],
        }
    }

    /// Percentages in table column order
    pub fn percents(&self) -> [u16; COLUMN_COUNT] {
        [
            self.container_id_width,
            self.container_name_width,
            self.memory_width,
            self.cpu_width,
            self.net_io_width,
            self.disk_io_width,
            self.image_width,
            self.status_width,
            self.port_width,
        ]
    }

    /// Rescale so the percentages sum to exactly 100
    pub fn normalize(&mut self) {
        *self = Self::from_percents(normalize_percents(self.percents()));
    }
}

/// Scale percentages proportionally so they sum to 100.
///
/// Each value is floored; the rounding remainder goes to the first column.
/// An all-zero set falls back to the defaults.
pub fn normalize_percents(p: [u16; COLUMN_COUNT]) -> [u16; COLUMN_COUNT] {
    let total: u32 = p.iter().map(|&v| v as u32).sum();
    if total == 0 {
        return DEFAULT_COLUMN_PERCENTS;
    }
    if total == 100 {
        return p;
    }

    let mut out = [0u16; COLUMN_COUNT];
    for (slot, &value) in out.iter_mut().zip(p.iter()) {
        *slot = (value as u32 * 100 / total) as u16;
    }
    let assigned: u16 = out.iter().sum();
    out[0] += 100 - assigned;
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Refresh interval in seconds
    pub poll_rate: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { poll_rate: 2 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    #[serde(rename = "type")]
    pub kind: RuntimeKind,
    /// Reserved; the CLI backends talk to their default sockets
    pub socket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Shell started by the exec action
    pub shell: String,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default path.
    ///
    /// Never fails: a missing, unreadable or invalid file yields defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::debug!("No config directory ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific path, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific path, reporting read and parse errors
    pub fn try_load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut settings: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        settings.sanitize();

        tracing::debug!(
            "Loaded config from {:?}: runtime={} poll_rate={}",
            path,
            settings.runtime.kind,
            settings.performance.poll_rate
        );

        Ok(settings)
    }

    /// Save settings to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_yaml::to_string(self)?;

        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        config_path_from(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        )
    }

    /// Refresh interval, clamped to the supported range
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.performance.poll_rate.clamp(MIN_POLL_RATE, MAX_POLL_RATE),
        )
    }

    /// Repair out-of-range values read from disk
    fn sanitize(&mut self) {
        self.layout.normalize();
        self.performance.poll_rate = self
            .performance
            .poll_rate
            .clamp(MIN_POLL_RATE, MAX_POLL_RATE);
        if self.exec.shell.trim().is_empty() {
            self.exec.shell = DEFAULT_SHELL.to_string();
        }
    }
}

/// Resolve the config file path from an optional XDG config home and home dir
pub fn config_path_from(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
        Some(xdg) => xdg,
        None => home.ok_or(ConfigError::NoConfigDir)?.join(".config"),
    };
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}
