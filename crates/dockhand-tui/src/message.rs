//! Messages consumed by the update loop and the commands it issues

use crossterm::event::KeyEvent;
use dockhand_config::{ConfigError, Settings};
use dockhand_runtime::{ActionVerb, ComposeProject, Container, RuntimeError};
use std::collections::BTreeMap;
use std::time::Duration;

/// Everything that can change application state
#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Periodic refresh timer fired; carries the generation it was scheduled under
    Tick(u64),
    ContainersLoaded(Result<Vec<Container>, RuntimeError>),
    ComposeProjectsLoaded(Result<BTreeMap<String, ComposeProject>, RuntimeError>),
    LogsLoaded {
        id: String,
        result: Result<Vec<String>, RuntimeError>,
    },
    ActionDone {
        verb: ActionVerb,
        id: String,
        result: Result<(), RuntimeError>,
    },
    ShellExited(std::io::Result<()>),
    SettingsSaved(Result<(), ConfigError>),
}

/// Side effects requested by `App::update`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchContainers,
    FetchComposeProjects,
    FetchLogs(String),
    PerformAction(ActionVerb, String),
    /// Post a `Tick(generation)` after the interval
    Tick { interval: Duration, generation: u64 },
    SaveSettings(Settings),
    /// Run an interactive shell in the foreground
    OpenShell { id: String, shell: String },
}
