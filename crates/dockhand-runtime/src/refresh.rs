//! Snapshot pipelines run by the background workers
//!
//! list → normalize → one batched metrics query → merge (→ group)

use crate::normalize::{attach_metrics, group_projects, normalize_listing, running_ids};
use crate::{ComposeProject, Container, Result, RuntimeClient};
use std::collections::BTreeMap;

/// Fresh snapshot of every container, with metrics for the running ones.
///
/// A failed metrics query is not fatal: the listing is returned with
/// metrics marked unavailable.
pub async fn refresh_containers(client: &dyn RuntimeClient) -> Result<Vec<Container>> {
    let raw = client.list_containers().await?;
    let mut containers = normalize_listing(&raw);
    load_metrics(client, &mut containers).await;
    tracing::debug!("Refreshed {} containers", containers.len());
    Ok(containers)
}

/// Fresh snapshot of compose projects keyed (and therefore ordered) by name
pub async fn refresh_compose_projects(
    client: &dyn RuntimeClient,
) -> Result<BTreeMap<String, ComposeProject>> {
    let raw = client.list_compose_projects().await?;
    let mut containers = normalize_listing(&raw);
    load_metrics(client, &mut containers).await;
    let projects = group_projects(containers);
    tracing::debug!("Refreshed {} compose projects", projects.len());
    Ok(projects)
}

async fn load_metrics(client: &dyn RuntimeClient, containers: &mut [Container]) {
    let ids = running_ids(containers);
    if ids.is_empty() {
        return;
    }
    match client.fetch_metrics(&ids).await {
        Ok(metrics) => attach_metrics(containers, &metrics),
        Err(e) => tracing::warn!("Metrics unavailable: {}", e),
    }
}
