//! CLI-based runtime clients for Docker and Podman
//!
//! Every call shells out to the engine binary with a bounded timeout.
//! Subprocesses are killed when their timeout future is dropped.

use crate::normalize::{compose_project_label, parse_stats_output, MetricsMap};
use crate::{
    ActionVerb, RawListing, Result, RuntimeClient, RuntimeError, RuntimeKind, ACTION_TIMEOUT,
    LISTING_TIMEOUT, LOGS_TIMEOUT, METRICS_TIMEOUT,
};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Stats template for Podman, whose `{{json .}}` output differs from Docker's
const PODMAN_STATS_FORMAT: &str = r#"{"ID":"{{.ID}}","CPUPerc":"{{.CPUPerc}}","MemPerc":"{{.MemPerc}}","NetIO":"{{.NetIO}}","BlockIO":"{{.BlockIO}}"}"#;

/// Runs engine commands and maps failures into [`RuntimeError`]
#[derive(Debug, Clone)]
pub struct CliRunner {
    /// Binary to invoke ("docker", "podman")
    cmd: String,
}

impl CliRunner {
    pub fn new(kind: RuntimeKind) -> Self {
        Self::with_binary(kind.binary())
    }

    pub fn with_binary(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.cmd);
        cmd.kill_on_drop(true);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        match args.first() {
            Some(sub) => format!("{} {}", self.cmd, sub),
            None => self.cmd.clone(),
        }
    }

    /// Run a command and return its raw output, failing on timeout or spawn error
    pub async fn run_output(&self, args: &[&str], timeout: Duration) -> Result<Output> {
        let command = self.describe(args);
        let mut cmd = self.build_command();
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("Running {} {:?}", self.cmd, args);
        match tokio::time::timeout(timeout, cmd.output()).await {
            Err(_) => Err(RuntimeError::Timeout {
                operation: command,
                seconds: timeout.as_secs(),
            }),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(RuntimeError::NotFound {
                binary: self.cmd.clone(),
            }),
            Ok(Err(e)) => Err(RuntimeError::Spawn { command, source: e }),
            Ok(Ok(output)) => Ok(output),
        }
    }

    /// Run a command and return stdout, failing on non-zero exit
    pub async fn run_cmd(&self, args: &[&str], timeout: Duration) -> Result<String> {
        let output = self.run_output(args, timeout).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RuntimeError::CommandFailed {
                command: self.describe(args),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<Vec<String>> {
        let tail = tail.to_string();
        let args = ["logs", "--tail", tail.as_str(), id];
        let output = self.run_output(&args, LOGS_TIMEOUT).await?;
        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                command: self.describe(&args),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(collect_log_lines(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }

    async fn perform_action(&self, verb: ActionVerb, id: &str) -> Result<()> {
        self.run_cmd(&[verb.arg(), id], ACTION_TIMEOUT).await?;
        Ok(())
    }

    fn shell_command(&self, id: &str, shell: &str) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.cmd);
        cmd.args(["exec", "-it", id, shell]);
        cmd
    }
}

/// Container output lines: stdout first, then stderr. Blank lines are dropped.
pub fn collect_log_lines(stdout: &str, stderr: &str) -> Vec<String> {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Docker CLI client
#[derive(Debug, Clone)]
pub struct DockerCli {
    runner: CliRunner,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            runner: CliRunner::new(RuntimeKind::Docker),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeClient for DockerCli {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Docker
    }

    async fn ping(&self) -> Result<String> {
        // Server version requires a reachable daemon
        let out = self
            .runner
            .run_cmd(&["version", "--format", "{{.Server.Version}}"], LISTING_TIMEOUT)
            .await?;
        Ok(out.trim().to_string())
    }

    async fn list_containers(&self) -> Result<RawListing> {
        let output = self
            .runner
            .run_cmd(&["ps", "-a", "--format", "{{json .}}"], LISTING_TIMEOUT)
            .await?;
        Ok(RawListing {
            kind: RuntimeKind::Docker,
            output,
        })
    }

    async fn list_compose_projects(&self) -> Result<RawListing> {
        let filter = format!("label={}", compose_project_label(RuntimeKind::Docker));
        let output = self
            .runner
            .run_cmd(
                &["ps", "-a", "--filter", filter.as_str(), "--format", "{{json .}}"],
                LISTING_TIMEOUT,
            )
            .await?;
        Ok(RawListing {
            kind: RuntimeKind::Docker,
            output,
        })
    }

    async fn fetch_metrics(&self, ids: &[String]) -> Result<MetricsMap> {
        if ids.is_empty() {
            return Ok(MetricsMap::new());
        }
        let mut args = vec!["stats", "--no-stream", "--format", "{{json .}}"];
        args.extend(ids.iter().map(String::as_str));
        let output = self.runner.run_cmd(&args, METRICS_TIMEOUT).await?;
        Ok(parse_stats_output(&output))
    }

    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<Vec<String>> {
        self.runner.fetch_logs(id, tail).await
    }

    async fn perform_action(&self, verb: ActionVerb, id: &str) -> Result<()> {
        self.runner.perform_action(verb, id).await
    }

    fn shell_command(&self, id: &str, shell: &str) -> std::process::Command {
        self.runner.shell_command(id, shell)
    }
}

/// Podman CLI client
#[derive(Debug, Clone)]
pub struct PodmanCli {
    runner: CliRunner,
}

impl PodmanCli {
    pub fn new() -> Self {
        Self {
            runner: CliRunner::new(RuntimeKind::Podman),
        }
    }
}

impl Default for PodmanCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeClient for PodmanCli {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Podman
    }

    async fn ping(&self) -> Result<String> {
        let out = self
            .runner
            .run_cmd(&["version", "--format", "{{.Client.Version}}"], LISTING_TIMEOUT)
            .await?;
        Ok(out.trim().to_string())
    }

    async fn list_containers(&self) -> Result<RawListing> {
        let output = self
            .runner
            .run_cmd(&["ps", "-a", "--format", "json"], LISTING_TIMEOUT)
            .await?;
        Ok(RawListing {
            kind: RuntimeKind::Podman,
            output,
        })
    }

    async fn list_compose_projects(&self) -> Result<RawListing> {
        let filter = format!("label={}", compose_project_label(RuntimeKind::Podman));
        let output = self
            .runner
            .run_cmd(
                &["ps", "-a", "--filter", filter.as_str(), "--format", "json"],
                LISTING_TIMEOUT,
            )
            .await?;
        Ok(RawListing {
            kind: RuntimeKind::Podman,
            output,
        })
    }

    async fn fetch_metrics(&self, ids: &[String]) -> Result<MetricsMap> {
        if ids.is_empty() {
            return Ok(MetricsMap::new());
        }
        let mut args = vec!["stats", "--no-stream", "--format", PODMAN_STATS_FORMAT];
        args.extend(ids.iter().map(String::as_str));
        let output = self.runner.run_cmd(&args, METRICS_TIMEOUT).await?;
        Ok(parse_stats_output(&output))
    }

    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<Vec<String>> {
        self.runner.fetch_logs(id, tail).await
    }

    async fn perform_action(&self, verb: ActionVerb, id: &str) -> Result<()> {
        self.runner.perform_action(verb, id).await
    }

    fn shell_command(&self, id: &str, shell: &str) -> std::process::Command {
        self.runner.shell_command(id, shell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== collect_log_lines tests ====================

    #[test]
    fn test_collect_log_lines_skips_blank_lines() {
        let lines = collect_log_lines("first  \n\n   \nsecond\n", "");
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_collect_log_lines_appends_stderr() {
        let lines = collect_log_lines("out\n", "err\n");
        assert_eq!(lines, vec!["out", "err"]);
    }

    #[test]
    fn test_collect_log_lines_keeps_ansi() {
        let lines = collect_log_lines("\x1b[32mready\x1b[0m\n", "");
        assert_eq!(lines, vec!["\x1b[32mready\x1b[0m"]);
    }

    // ==================== shell_command tests ====================

    #[test]
    fn test_shell_command_args() {
        let cmd = PodmanCli::new().shell_command("abc123", "/bin/bash");
        assert_eq!(cmd.get_program(), "podman");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["exec", "-it", "abc123", "/bin/bash"]);
    }

    // ==================== CliRunner tests ====================

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_cmd_returns_stdout() {
        let runner = CliRunner::with_binary("sh");
        let out = runner
            .run_cmd(&["-c", "echo hello"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_cmd_nonzero_exit_carries_stderr() {
        let runner = CliRunner::with_binary("sh");
        let err = runner
            .run_cmd(&["-c", "echo boom >&2; exit 3"], Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            RuntimeError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_cmd_times_out() {
        let runner = CliRunner::with_binary("sh");
        let err = runner
            .run_cmd(&["-c", "sleep 5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found() {
        let runner = CliRunner::with_binary("dockhand-no-such-binary");
        let err = runner
            .run_cmd(&["ps"], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NotFound { .. }));
    }
}
