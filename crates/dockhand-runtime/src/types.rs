//! Canonical container data model

use crate::units;
use dockhand_config::RuntimeKind;
use std::fmt;

/// Normalized container state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerState {
    Running,
    Paused,
    Restarting,
    Exited,
    Created,
    Unknown,
}

impl ContainerState {
    /// Derive the state from a free-text status such as `"Up 2 minutes"`.
    ///
    /// Rules are applied in order; the first match wins.
    pub fn from_status(status: &str) -> Self {
        let s = status.trim().to_lowercase();
        if s.starts_with("up") {
            ContainerState::Running
        } else if s.contains("paused") {
            ContainerState::Paused
        } else if s.contains("restarting") {
            ContainerState::Restarting
        } else if s.contains("exited") || s.contains("dead") {
            ContainerState::Exited
        } else if s.starts_with("created") {
            ContainerState::Created
        } else {
            ContainerState::Unknown
        }
    }

    /// Map a bare engine state word (`"running"`, `"exited"`, ...)
    pub fn from_state_word(word: &str) -> Self {
        match word.trim().to_lowercase().as_str() {
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "exited" | "dead" | "stopped" => ContainerState::Exited,
            "created" | "configured" => ContainerState::Created,
            _ => ContainerState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Exited => "exited",
            ContainerState::Created => "created",
            ContainerState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metrics sample for a running container, as reported by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceUsage {
    pub cpu: String,
    pub memory: String,
    pub net_io: String,
    pub block_io: String,
}

impl ResourceUsage {
    pub fn cpu_percent(&self) -> f64 {
        units::parse_percent(&self.cpu)
    }

    pub fn memory_percent(&self) -> f64 {
        units::parse_percent(&self.memory)
    }

    pub fn net_io_bytes(&self) -> f64 {
        units::parse_io_pair(&self.net_io)
    }

    pub fn block_io_bytes(&self) -> f64 {
        units::parse_io_pair(&self.block_io)
    }
}

/// Compose labels attached to a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeAssociation {
    pub project: String,
    pub service: String,
    pub container_number: String,
    pub config_files: String,
    pub working_dir: String,
}

/// A normalized container, independent of the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    /// Free-text status as reported by the engine
    pub status: String,
    pub state: ContainerState,
    /// `None` means metrics are unavailable (not running, or the stats query failed)
    pub usage: Option<ResourceUsage>,
    pub ports: String,
    pub compose: Option<ComposeAssociation>,
}

impl Container {
    /// Primary display name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }

    pub fn project(&self) -> Option<&str> {
        self.compose.as_ref().map(|c| c.project.as_str())
    }

    pub fn cpu_percent(&self) -> f64 {
        self.usage.as_ref().map_or(0.0, ResourceUsage::cpu_percent)
    }

    pub fn memory_percent(&self) -> f64 {
        self.usage.as_ref().map_or(0.0, ResourceUsage::memory_percent)
    }

    pub fn net_io_bytes(&self) -> f64 {
        self.usage.as_ref().map_or(0.0, ResourceUsage::net_io_bytes)
    }

    pub fn block_io_bytes(&self) -> f64 {
        self.usage.as_ref().map_or(0.0, ResourceUsage::block_io_bytes)
    }
}

/// Aggregate run status of a compose project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    AllRunning,
    SomeStopped,
    AllStopped,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::AllRunning => "running",
            ProjectStatus::SomeStopped => "partial",
            ProjectStatus::AllStopped => "stopped",
        }
    }
}

/// A compose application: its members and where it was defined
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeProject {
    pub name: String,
    pub config_file: String,
    pub working_dir: String,
    pub containers: Vec<Container>,
    pub status: ProjectStatus,
}

impl ComposeProject {
    /// Build a project from its members, deriving the aggregate status
    pub fn new(name: impl Into<String>, containers: Vec<Container>) -> Self {
        let first = containers.iter().find_map(|c| c.compose.as_ref());
        let config_file = first.map(|c| c.config_files.clone()).unwrap_or_default();
        let working_dir = first.map(|c| c.working_dir.clone()).unwrap_or_default();
        let running = containers.iter().filter(|c| c.is_running()).count();
        let status = if running == 0 {
            ProjectStatus::AllStopped
        } else if running == containers.len() {
            ProjectStatus::AllRunning
        } else {
            ProjectStatus::SomeStopped
        };
        Self {
            name: name.into(),
            config_file,
            working_dir,
            containers,
            status,
        }
    }

    pub fn running_count(&self) -> usize {
        self.containers.iter().filter(|c| c.is_running()).count()
    }
}

/// Lifecycle action on a single container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVerb {
    Start,
    Stop,
    Restart,
    Remove,
}

impl ActionVerb {
    /// CLI subcommand for this action
    pub fn arg(&self) -> &'static str {
        match self {
            ActionVerb::Start => "start",
            ActionVerb::Stop => "stop",
            ActionVerb::Restart => "restart",
            ActionVerb::Remove => "rm",
        }
    }

    /// Progressive verb for status messages
    pub fn progress_label(&self) -> &'static str {
        match self {
            ActionVerb::Start => "Starting",
            ActionVerb::Stop => "Stopping",
            ActionVerb::Restart => "Restarting",
            ActionVerb::Remove => "Removing",
        }
    }
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arg())
    }
}

/// Unparsed listing output, tagged with the engine that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    pub kind: RuntimeKind,
    pub output: String,
}
