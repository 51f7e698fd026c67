//! In-memory runtime for tests
//!
//! `FakeRuntime` serves canned listings and records every call, so the
//! refresh pipelines and the TUI dispatcher can be exercised without an engine.

use crate::{
    ActionVerb, MetricsMap, RawListing, ResourceUsage, Result, RuntimeClient, RuntimeError,
    RuntimeKind,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Calls {
    metrics: Vec<Vec<String>>,
    logs: Vec<(String, usize)>,
    actions: Vec<(ActionVerb, String)>,
    listings: usize,
}

/// Scriptable [`RuntimeClient`] with call recording
#[derive(Debug)]
pub struct FakeRuntime {
    kind: RuntimeKind,
    listing: Option<String>,
    compose_listing: Option<String>,
    metrics: Option<MetricsMap>,
    logs: Option<HashMap<String, Vec<String>>>,
    actions_fail: bool,
    calls: Mutex<Calls>,
}

fn fake_error(what: &str) -> RuntimeError {
    RuntimeError::CommandFailed {
        command: format!("fake {}", what),
        stderr: format!("{} unavailable", what),
    }
}

impl FakeRuntime {
    /// Empty runtime: listings succeed with no containers
    pub fn new(kind: RuntimeKind) -> Self {
        Self {
            kind,
            listing: Some(String::new()),
            compose_listing: Some(String::new()),
            metrics: Some(MetricsMap::new()),
            logs: Some(HashMap::new()),
            actions_fail: false,
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn with_listing(mut self, output: &str) -> Self {
        self.listing = Some(output.to_string());
        self
    }

    pub fn with_compose_listing(mut self, output: &str) -> Self {
        self.compose_listing = Some(output.to_string());
        self
    }

    pub fn with_metrics(mut self, samples: Vec<(&str, ResourceUsage)>) -> Self {
        self.metrics = Some(
            samples
                .into_iter()
                .map(|(id, usage)| (id.to_string(), usage))
                .collect(),
        );
        self
    }

    pub fn with_logs(mut self, id: &str, lines: &[&str]) -> Self {
        self.logs
            .get_or_insert_with(HashMap::new)
            .insert(id.to_string(), lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.listing = None;
        self.compose_listing = None;
        self
    }

    pub fn failing_metrics(mut self) -> Self {
        self.metrics = None;
        self
    }

    pub fn failing_logs(mut self) -> Self {
        self.logs = None;
        self
    }

    pub fn failing_actions(mut self) -> Self {
        self.actions_fail = true;
        self
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Id batches passed to `fetch_metrics`
    pub fn metrics_calls(&self) -> Vec<Vec<String>> {
        self.calls().metrics.clone()
    }

    /// `(id, tail)` pairs passed to `fetch_logs`
    pub fn logs_calls(&self) -> Vec<(String, usize)> {
        self.calls().logs.clone()
    }

    /// Actions performed, in order
    pub fn actions(&self) -> Vec<(ActionVerb, String)> {
        self.calls().actions.clone()
    }

    /// Number of listing calls (plain and compose)
    pub fn listing_calls(&self) -> usize {
        self.calls().listings
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    fn kind(&self) -> RuntimeKind {
        self.kind
    }

    async fn ping(&self) -> Result<String> {
        Ok("fake".to_string())
    }

    async fn list_containers(&self) -> Result<RawListing> {
        self.calls().listings += 1;
        let output = self.listing.clone().ok_or_else(|| fake_error("ps"))?;
        Ok(RawListing {
            kind: self.kind,
            output,
        })
    }

    async fn list_compose_projects(&self) -> Result<RawListing> {
        self.calls().listings += 1;
        let output = self.compose_listing.clone().ok_or_else(|| fake_error("ps"))?;
        Ok(RawListing {
            kind: self.kind,
            output,
        })
    }

    async fn fetch_metrics(&self, ids: &[String]) -> Result<MetricsMap> {
        self.calls().metrics.push(ids.to_vec());
        self.metrics.clone().ok_or_else(|| fake_error("stats"))
    }

    async fn fetch_logs(&self, id: &str, tail: usize) -> Result<Vec<String>> {
        self.calls().logs.push((id.to_string(), tail));
        let logs = self.logs.as_ref().ok_or_else(|| fake_error("logs"))?;
        Ok(logs.get(id).cloned().unwrap_or_default())
    }

    async fn perform_action(&self, verb: ActionVerb, id: &str) -> Result<()> {
        self.calls().actions.push((verb, id.to_string()));
        if self.actions_fail {
            return Err(fake_error(verb.arg()));
        }
        Ok(())
    }

    fn shell_command(&self, _id: &str, _shell: &str) -> std::process::Command {
        let mut cmd = std::process::Command::new("sh");
        cmd.args(["-c", "exit 0"]);
        cmd
    }
}
