//! Startup check that the configured engine answers

use anyhow::{anyhow, Result};
use dockhand_runtime::{RuntimeClient, RuntimeError, RuntimeKind};

/// Ping the engine; on failure the error carries a hint for fixing it
pub async fn check(client: &dyn RuntimeClient) -> Result<String> {
    match client.ping().await {
        Ok(version) => {
            tracing::info!("{} {} reachable", client.kind(), version);
            Ok(version)
        }
        Err(e) => {
            tracing::warn!("Preflight failed: {}", e);
            Err(anyhow!("{}\n\n{}", e, hint(client.kind(), &e)))
        }
    }
}

/// Suggested next step for a failed ping
pub fn hint(kind: RuntimeKind, error: &RuntimeError) -> &'static str {
    match (kind, error) {
        (RuntimeKind::Docker, RuntimeError::NotFound { .. }) => {
            "Install Docker: https://docs.docker.com/engine/install/\n\
             Or run `dockhand --runtime` to pick another engine."
        }
        (RuntimeKind::Podman, RuntimeError::NotFound { .. }) => {
            "Install Podman: https://podman.io/docs/installation\n\
             Or run `dockhand --runtime` to pick another engine."
        }
        (RuntimeKind::Docker, RuntimeError::CommandFailed { stderr, .. })
            if stderr.contains("permission denied") =>
        {
            "Add your user to the docker group:\n\n  sudo usermod -aG docker $USER\n\n\
             Then log out and back in."
        }
        (RuntimeKind::Docker, _) => {
            "Is the Docker daemon running? Start it with:\n\n  sudo systemctl start docker"
        }
        (RuntimeKind::Podman, _) => {
            "Check that Podman works with `podman info`. On macOS and Windows start the VM with:\n\n  \
             podman machine start"
        }
    }
}
