//! Conversion of raw engine listings into canonical containers
//!
//! Docker prints one JSON object per line; Podman prints a single JSON array
//! (older releases fall back to one object per line). Records that fail to
//! parse, or that carry no id, are skipped with a warning.

use crate::{
    ComposeAssociation, ComposeProject, Container, ContainerState, RawListing, ResourceUsage,
    RuntimeKind,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Metrics samples keyed by the id the engine reported (possibly truncated)
pub type MetricsMap = BTreeMap<String, ResourceUsage>;

/// Label carrying the systemd unit for containers started from quadlets
const SYSTEMD_UNIT_LABEL: &str = "PODMAN_SYSTEMD_UNIT";

/// Compose label prefix for a runtime
pub fn compose_label_prefix(kind: RuntimeKind) -> &'static str {
    match kind {
        RuntimeKind::Docker => "com.docker.compose",
        RuntimeKind::Podman => "io.podman.compose",
    }
}

/// Label used to filter compose containers in listings
pub fn compose_project_label(kind: RuntimeKind) -> String {
    format!("{}.project", compose_label_prefix(kind))
}

/// Normalize a raw `ps` listing into canonical containers
pub fn normalize_listing(raw: &RawListing) -> Vec<Container> {
    let records = json_records(&raw.output);
    let mut containers = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for value in records {
        let container = match raw.kind {
            RuntimeKind::Docker => serde_json::from_value::<DockerRecord>(value)
                .ok()
                .and_then(DockerRecord::into_container),
            RuntimeKind::Podman => serde_json::from_value::<PodmanRecord>(value)
                .ok()
                .and_then(PodmanRecord::into_container),
        };
        match container {
            Some(c) => containers.push(c),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed {} container record(s)", skipped, raw.kind);
    }
    containers
}

/// Split output into JSON values, accepting a single array or one object per line
fn json_records(output: &str) -> Vec<serde_json::Value> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        if let Ok(arr) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            return arr;
        }
    }

    let mut parse_errors = 0usize;
    let records = trimmed
        .lines()
        .filter_map(|line| {
            let t = line.trim();
            if t.is_empty() {
                return None;
            }
            match serde_json::from_str::<serde_json::Value>(t) {
                Ok(v) => Some(v),
                Err(_) => {
                    parse_errors += 1;
                    None
                }
            }
        })
        .collect();

    if parse_errors > 0 {
        tracing::warn!("Skipped {} unparseable JSON line(s)", parse_errors);
    }
    records
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DockerRecord {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Ports")]
    ports: String,
    #[serde(rename = "Labels")]
    labels: String,
}

impl DockerRecord {
    fn into_container(self) -> Option<Container> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return None;
        }
        let labels = parse_cli_labels(&self.labels);
        Some(Container {
            id,
            names: split_trimmed(&self.names, ','),
            image: self.image,
            state: resolve_state(&self.status, &self.state),
            status: self.status,
            usage: None,
            ports: split_trimmed(&self.ports, ',').join(", "),
            compose: compose_association(RuntimeKind::Docker, &labels),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodmanRecord {
    #[serde(rename = "Id", alias = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: Vec<String>,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Ports")]
    ports: Option<Vec<PodmanPort>>,
    #[serde(rename = "Labels")]
    labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodmanPort {
    host_ip: String,
    host_port: u32,
    container_port: u32,
    protocol: String,
}

impl PodmanRecord {
    fn into_container(self) -> Option<Container> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return None;
        }
        let labels = self.labels.unwrap_or_default();
        let ports = self
            .ports
            .unwrap_or_default()
            .iter()
            .filter(|p| p.host_port > 0)
            .map(|p| {
                let host_ip = if p.host_ip.is_empty() { "0.0.0.0" } else { p.host_ip.as_str() };
                format!("{}:{}->{}/{}", host_ip, p.host_port, p.container_port, p.protocol)
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(Container {
            id,
            names: self
                .names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            image: self.image,
            state: resolve_state(&self.status, &self.state),
            status: self.status,
            usage: None,
            ports,
            compose: compose_association(RuntimeKind::Podman, &labels),
        })
    }
}

/// Status text rules first, then the engine's own state word
fn resolve_state(status: &str, state: &str) -> ContainerState {
    match ContainerState::from_status(status) {
        ContainerState::Unknown => ContainerState::from_state_word(state),
        known => known,
    }
}

fn split_trimmed(s: &str, delimiter: char) -> Vec<String> {
    s.split(delimiter)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse Docker's `k=v,k2=v2` label string. Values may contain `=`.
pub fn parse_cli_labels(label_str: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    for part in label_str.split(',') {
        if let Some((key, value)) = part.split_once('=') {
            labels.insert(key.trim().to_string(), value.to_string());
        }
    }
    labels
}

/// Resolve compose membership from labels.
///
/// Looks at the runtime's own compose labels, then Docker-style labels
/// (podman-compose writes both), then the systemd unit label.
pub fn compose_association(
    kind: RuntimeKind,
    labels: &HashMap<String, String>,
) -> Option<ComposeAssociation> {
    let mut prefixes = vec![compose_label_prefix(kind)];
    if kind != RuntimeKind::Docker {
        prefixes.push(compose_label_prefix(RuntimeKind::Docker));
    }

    let lookup = |prefix: &str, key: &str| -> String {
        labels
            .get(&format!("{}.{}", prefix, key))
            .cloned()
            .unwrap_or_default()
    };

    for prefix in prefixes {
        let project = lookup(prefix, "project");
        if !project.trim().is_empty() {
            return Some(ComposeAssociation {
                project: project.trim().to_string(),
                service: lookup(prefix, "service"),
                container_number: lookup(prefix, "container-number"),
                config_files: lookup(prefix, "project.config_files"),
                working_dir: lookup(prefix, "project.working_dir"),
            });
        }
    }

    let unit = labels.get(SYSTEMD_UNIT_LABEL)?;
    let project = unit.strip_suffix(".service").unwrap_or(unit).trim();
    if project.is_empty() {
        return None;
    }
    Some(ComposeAssociation {
        project: project.to_string(),
        ..ComposeAssociation::default()
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsRecord {
    #[serde(rename = "ID", alias = "Id")]
    id: String,
    #[serde(rename = "CPUPerc")]
    cpu: String,
    #[serde(rename = "MemPerc")]
    memory: String,
    #[serde(rename = "NetIO")]
    net_io: String,
    #[serde(rename = "BlockIO")]
    block_io: String,
}

/// Parse batched `stats --no-stream` output, one JSON object per line
pub fn parse_stats_output(output: &str) -> MetricsMap {
    let mut metrics = MetricsMap::new();
    for value in json_records(output) {
        let Ok(record) = serde_json::from_value::<StatsRecord>(value) else {
            continue;
        };
        let id = record.id.trim().to_string();
        if id.is_empty() {
            continue;
        }
        metrics.insert(
            id,
            ResourceUsage {
                cpu: record.cpu,
                memory: record.memory,
                net_io: record.net_io,
                block_io: record.block_io,
            },
        );
    }
    metrics
}

/// Ids of running containers, in listing order
pub fn running_ids(containers: &[Container]) -> Vec<String> {
    containers
        .iter()
        .filter(|c| c.is_running())
        .map(|c| c.id.clone())
        .collect()
}

/// Merge metrics samples into running containers.
///
/// Exact id matches win; otherwise a sample whose id is a prefix of the
/// container id (or the reverse) is used. Containers without a sample keep
/// `usage = None`.
pub fn attach_metrics(containers: &mut [Container], metrics: &MetricsMap) {
    for container in containers.iter_mut() {
        if !container.is_running() {
            container.usage = None;
            continue;
        }
        let full_id = container.id.as_str();
        let usage = metrics.get(full_id).cloned().or_else(|| {
            metrics
                .iter()
                .find(|(id, _)| full_id.starts_with(id.as_str()) || id.starts_with(full_id))
                .map(|(_, usage)| usage.clone())
        });
        container.usage = usage;
    }
}

/// Group compose containers by project name. Containers without a compose
/// association are left out.
pub fn group_projects(containers: Vec<Container>) -> BTreeMap<String, ComposeProject> {
    let mut members: BTreeMap<String, Vec<Container>> = BTreeMap::new();
    for container in containers {
        if let Some(project) = container.project().map(str::to_string) {
            members.entry(project).or_default().push(container);
        }
    }
    members
        .into_iter()
        .map(|(name, containers)| {
            let project = ComposeProject::new(name.clone(), containers);
            (name, project)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn docker(output: &str) -> RawListing {
        RawListing {
            kind: RuntimeKind::Docker,
            output: output.to_string(),
        }
    }

    fn podman(output: &str) -> RawListing {
        RawListing {
            kind: RuntimeKind::Podman,
            output: output.to_string(),
        }
    }

    const DOCKER_PS: &str = r#"{"Command":"\"/docker-entrypoint.…\"","ID":"a1b2c3d4e5f6","Image":"nginx:latest","Labels":"com.docker.compose.project=web,com.docker.compose.service=proxy,com.docker.compose.container-number=1,com.docker.compose.project.working_dir=/srv/web","Names":"web-proxy-1","Ports":"0.0.0.0:8080->80/tcp, :::8080->80/tcp","State":"running","Status":"Up 2 minutes"}
{"ID":"ffeeddccbbaa","Image":"redis:7","Labels":"","Names":"cache","Ports":"","State":"exited","Status":"Exited (0) 3 hours ago"}"#;

    const PODMAN_PS: &str = r#"[
  {"Id":"0123456789abcdef0123","Names":["db"],"Image":"docker.io/library/postgres:16","State":"running","Status":"Up 10 minutes",
   "Labels":{"io.podman.compose.project":"shop","io.podman.compose.service":"db","io.podman.compose.project.config_files":"compose.yml"},
   "Ports":[{"host_ip":"","container_port":5432,"host_port":5432,"range":1,"protocol":"tcp"},{"host_ip":"","container_port":9000,"host_port":0,"range":1,"protocol":"tcp"}]},
  {"Id":"9999aaaabbbbcccc","Names":["worker"],"Image":"alpine","State":"created","Status":"Created","Labels":null,"Ports":null}
]"#;

    // ==================== parse_cli_labels tests ====================

    #[test]
    fn test_parse_cli_labels_basic() {
        let labels = parse_cli_labels("foo=bar,baz=qux");
        assert_eq!(labels.get("foo").unwrap(), "bar");
        assert_eq!(labels.get("baz").unwrap(), "qux");
    }

    #[test]
    fn test_parse_cli_labels_value_with_equals() {
        let labels = parse_cli_labels("key=a=b,other=c");
        assert_eq!(labels.get("key").unwrap(), "a=b");
        assert_eq!(labels.get("other").unwrap(), "c");
    }

    #[test]
    fn test_parse_cli_labels_empty() {
        assert!(parse_cli_labels("").is_empty());
    }

    // ==================== docker listing tests ====================

    #[test]
    fn test_docker_listing() {
        let containers = normalize_listing(&docker(DOCKER_PS));
        assert_eq!(containers.len(), 2);

        let proxy = &containers[0];
        assert_eq!(proxy.id, "a1b2c3d4e5f6");
        assert_eq!(proxy.names, vec!["web-proxy-1"]);
        assert_eq!(proxy.state, ContainerState::Running);
        assert_eq!(proxy.ports, "0.0.0.0:8080->80/tcp, :::8080->80/tcp");
        let compose = proxy.compose.as_ref().unwrap();
        assert_eq!(compose.project, "web");
        assert_eq!(compose.service, "proxy");
        assert_eq!(compose.container_number, "1");
        assert_eq!(compose.working_dir, "/srv/web");

        let cache = &containers[1];
        assert_eq!(cache.state, ContainerState::Exited);
        assert!(cache.compose.is_none());
        assert!(cache.usage.is_none());
    }

    #[test]
    fn test_docker_multiple_names_are_split() {
        let containers =
            normalize_listing(&docker(r#"{"ID":"abc","Names":"one, two ,three","Status":"Up 1 second"}"#));
        assert_eq!(containers[0].names, vec!["one", "two", "three"]);
        assert_eq!(containers[0].name(), "one");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let output = format!(
            "{}\nnot json at all\n{{\"Names\":\"no-id\"}}\n{{\"ID\":42}}\n",
            DOCKER_PS
        );
        let containers = normalize_listing(&docker(&output));
        assert_eq!(containers.len(), 2);
    }

    #[test]
    fn test_empty_listing() {
        assert!(normalize_listing(&docker("")).is_empty());
        assert!(normalize_listing(&podman("[]")).is_empty());
    }

    // ==================== podman listing tests ====================

    #[test]
    fn test_podman_listing() {
        let containers = normalize_listing(&podman(PODMAN_PS));
        assert_eq!(containers.len(), 2);

        let db = &containers[0];
        assert_eq!(db.id, "0123456789abcdef0123");
        assert_eq!(db.state, ContainerState::Running);
        assert_eq!(db.ports, "0.0.0.0:5432->5432/tcp");
        let compose = db.compose.as_ref().unwrap();
        assert_eq!(compose.project, "shop");
        assert_eq!(compose.config_files, "compose.yml");

        let worker = &containers[1];
        assert_eq!(worker.state, ContainerState::Created);
        assert_eq!(worker.ports, "");
        assert!(worker.compose.is_none());
    }

    #[test]
    fn test_podman_ndjson_fallback() {
        let output = r#"{"Id":"abc123","Names":["a"],"Status":"Exited (1) 2 days ago","State":"exited"}
{"Id":"def456","Names":["b"],"Status":"","State":"paused"}"#;
        let containers = normalize_listing(&podman(output));
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].state, ContainerState::Exited);
        assert_eq!(containers[1].state, ContainerState::Paused);
    }

    // ==================== compose_association tests ====================

    #[test]
    fn test_compose_systemd_unit_fallback() {
        let mut labels = HashMap::new();
        labels.insert("PODMAN_SYSTEMD_UNIT".to_string(), "blog.service".to_string());
        let assoc = compose_association(RuntimeKind::Podman, &labels).unwrap();
        assert_eq!(assoc.project, "blog");
        assert_eq!(assoc.service, "");
    }

    #[test]
    fn test_compose_podman_accepts_docker_labels() {
        let mut labels = HashMap::new();
        labels.insert("com.docker.compose.project".to_string(), "api".to_string());
        let assoc = compose_association(RuntimeKind::Podman, &labels).unwrap();
        assert_eq!(assoc.project, "api");
    }

    #[test]
    fn test_compose_docker_ignores_podman_labels() {
        let mut labels = HashMap::new();
        labels.insert("io.podman.compose.project".to_string(), "api".to_string());
        assert!(compose_association(RuntimeKind::Docker, &labels).is_none());
    }

    #[test]
    fn test_no_association_without_labels() {
        assert!(compose_association(RuntimeKind::Podman, &HashMap::new()).is_none());
    }

    // ==================== metrics tests ====================

    #[test]
    fn test_parse_stats_output() {
        let output = r#"{"BlockIO":"0B / 0B","CPUPerc":"0.50%","Container":"a1b2c3d4e5f6","ID":"a1b2c3d4e5f6","MemPerc":"1.20%","NetIO":"1.2kB / 850B","Name":"web-proxy-1"}
garbage
{"ID":"","CPUPerc":"9%"}"#;
        let metrics = parse_stats_output(output);
        assert_eq!(metrics.len(), 1);
        let usage = &metrics["a1b2c3d4e5f6"];
        assert_eq!(usage.cpu, "0.50%");
        assert!((usage.net_io_bytes() - 2050.0).abs() < 1e-9);
    }

    #[test]
    fn test_attach_metrics_by_prefix() {
        let mut containers = normalize_listing(&podman(PODMAN_PS));
        let mut metrics = MetricsMap::new();
        metrics.insert(
            "0123456789ab".to_string(),
            ResourceUsage {
                cpu: "3.00%".to_string(),
                ..ResourceUsage::default()
            },
        );
        attach_metrics(&mut containers, &metrics);

        assert_eq!(containers[0].usage.as_ref().unwrap().cpu, "3.00%");
        // created container never gets metrics
        assert!(containers[1].usage.is_none());
    }

    #[test]
    fn test_attach_metrics_missing_sample_is_unavailable() {
        let mut containers = normalize_listing(&docker(DOCKER_PS));
        attach_metrics(&mut containers, &MetricsMap::new());
        assert!(containers.iter().all(|c| c.usage.is_none()));
    }

    #[test]
    fn test_running_ids() {
        let containers = normalize_listing(&docker(DOCKER_PS));
        assert_eq!(running_ids(&containers), vec!["a1b2c3d4e5f6".to_string()]);
    }

    // ==================== group_projects tests ====================

    #[test]
    fn test_group_projects() {
        let mut containers = normalize_listing(&docker(DOCKER_PS));
        containers.extend(normalize_listing(&podman(PODMAN_PS)));
        let projects = group_projects(containers);

        let names: Vec<_> = projects.keys().cloned().collect();
        assert_eq!(names, vec!["shop", "web"]);
        assert_eq!(projects["web"].containers.len(), 1);
        assert_eq!(projects["web"].working_dir, "/srv/web");
        assert_eq!(projects["shop"].config_file, "compose.yml");
    }

    // ==================== property tests ====================

    proptest! {
        #[test]
        fn prop_state_is_total(status in ".{0,40}") {
            let state = ContainerState::from_status(&status);
            prop_assert!(matches!(
                state,
                ContainerState::Running
                    | ContainerState::Paused
                    | ContainerState::Restarting
                    | ContainerState::Exited
                    | ContainerState::Created
                    | ContainerState::Unknown
            ));
        }

        #[test]
        fn prop_normalize_is_idempotent(
            names in proptest::collection::vec("[a-z]{1,8}", 1..6),
            statuses in proptest::collection::vec(
                prop_oneof![
                    Just("Up 2 minutes"),
                    Just("Exited (0) 3 hours ago"),
                    Just("Created"),
                    Just("Paused"),
                    Just("garbage"),
                ],
                1..6,
            ),
        ) {
            let output = names
                .iter()
                .zip(statuses.iter().cycle())
                .enumerate()
                .map(|(i, (name, status))| {
                    format!(
                        r#"{{"ID":"id{}","Names":"{}","Status":"{}","Labels":"com.docker.compose.project={}"}}"#,
                        i, name, status, name
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            let raw = docker(&output);
            let first = normalize_listing(&raw);
            let second = normalize_listing(&raw);
            prop_assert_eq!(first.len(), names.len());
            prop_assert_eq!(first, second);
        }
    }
}
