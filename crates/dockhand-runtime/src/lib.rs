//! Container runtime access for dockhand
//!
//! This crate talks to Docker or Podman through their CLIs and turns the
//! engine-specific output into one canonical data model.

mod cli;
mod error;
pub mod normalize;
mod refresh;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
mod types;
pub mod units;

pub use cli::{collect_log_lines, CliRunner, DockerCli, PodmanCli};
pub use dockhand_config::RuntimeKind;
pub use error::*;
pub use normalize::MetricsMap;
pub use refresh::{refresh_compose_projects, refresh_containers};
pub use types::*;

use async_trait::async_trait;
use std::time::Duration;

/// Bound on a batched metrics query
pub const METRICS_TIMEOUT: Duration = Duration::from_secs(3);
/// Bound on a logs tail
pub const LOGS_TIMEOUT: Duration = Duration::from_secs(5);
/// Bound on listings and version checks
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(30);
/// Bound on start/stop/restart/remove
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of log lines fetched for the logs panel
pub const LOG_TAIL_LINES: usize = 100;

/// Access to one container engine
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Which backend this client drives
    fn kind(&self) -> RuntimeKind;

    /// Check the engine is reachable; returns its version string
    async fn ping(&self) -> Result<String>;

    /// List all containers, running or not
    async fn list_containers(&self) -> Result<RawListing>;

    /// List containers carrying the compose project label
    async fn list_compose_projects(&self) -> Result<RawListing>;

    /// One batched metrics snapshot for the given running container ids
    async fn fetch_metrics(&self, ids: &[String]) -> Result<MetricsMap>;

    /// Last `tail` log lines of a container
    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<Vec<String>>;

    /// Start, stop, restart or remove a container
    async fn perform_action(&self, verb: ActionVerb, id: &str) -> Result<()>;

    /// Foreground command that opens an interactive shell in a container
    fn shell_command(&self, id: &str, shell: &str) -> std::process::Command;
}

/// Create the client for a runtime backend
pub fn create_client(kind: RuntimeKind) -> Box<dyn RuntimeClient> {
    tracing::info!("Using {} runtime", kind);
    match kind {
        RuntimeKind::Docker => Box::new(DockerCli::new()),
        RuntimeKind::Podman => Box::new(PodmanCli::new()),
    }
}

/// Check which runtimes respond, concurrently
pub async fn detect_available_runtimes() -> Vec<(RuntimeKind, bool)> {
    let docker = DockerCli::new();
    let podman = PodmanCli::new();
    let (docker_result, podman_result) = tokio::join!(docker.ping(), podman.ping());

    if let Err(e) = &docker_result {
        tracing::debug!("Docker not available: {}", e);
    }
    if let Err(e) = &podman_result {
        tracing::debug!("Podman not available: {}", e);
    }

    vec![
        (RuntimeKind::Docker, docker_result.is_ok()),
        (RuntimeKind::Podman, podman_result.is_ok()),
    ]
}
