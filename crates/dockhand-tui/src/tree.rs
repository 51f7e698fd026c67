//! Compose project tree
//!
//! The tree is a flat list of rows: a header per project (sorted by name),
//! followed by that project's containers when it is expanded, and a trailing
//! "Standalone" group for containers outside any project. It is rebuilt from
//! scratch whenever its inputs change.

use dockhand_runtime::{ComposeProject, Container, ProjectStatus};
use std::collections::{BTreeMap, HashMap};

/// Display name of the group holding containers outside any project
pub const STANDALONE_LABEL: &str = "Standalone";

/// Identity of an expandable group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Project(String),
    Standalone,
}

impl GroupKey {
    pub fn label(&self) -> &str {
        match self {
            GroupKey::Project(name) => name,
            GroupKey::Standalone => STANDALONE_LABEL,
        }
    }
}

/// One rendered row of the compose view
#[derive(Debug, Clone, PartialEq)]
pub enum TreeRow {
    Header {
        group: GroupKey,
        expanded: bool,
        running: usize,
        total: usize,
        /// Aggregate status; projects only
        status: Option<ProjectStatus>,
    },
    Container {
        group: GroupKey,
        container: Container,
        indent: u8,
    },
}

impl TreeRow {
    pub fn group(&self) -> &GroupKey {
        match self {
            TreeRow::Header { group, .. } | TreeRow::Container { group, .. } => group,
        }
    }

    pub fn container(&self) -> Option<&Container> {
        match self {
            TreeRow::Container { container, .. } => Some(container),
            TreeRow::Header { .. } => None,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, TreeRow::Header { .. })
    }
}

/// Expand/collapse state; groups are expanded unless marked otherwise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion(HashMap<GroupKey, bool>);

impl Expansion {
    pub fn is_expanded(&self, group: &GroupKey) -> bool {
        self.0.get(group).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, group: &GroupKey) {
        let expanded = self.is_expanded(group);
        self.0.insert(group.clone(), !expanded);
    }

    /// Forget all choices, expanding everything
    pub fn reset(&mut self) {
        self.0.clear();
    }
}

/// Flatten projects and standalone containers into rows.
///
/// A container is standalone when it has no compose project, or its project
/// is absent from `projects`.
///
/// Member order is taken as given, so callers sort before building.
pub fn build_tree(
    projects: &BTreeMap<String, ComposeProject>,
    containers: &[Container],
    expansion: &Expansion,
) -> Vec<TreeRow> {
    let mut rows = Vec::new();

    for (name, project) in projects {
        let header = Header {
            group: GroupKey::Project(name.clone()),
            running: project.running_count(),
            status: Some(project.status),
        };
        push_group(&mut rows, header, &project.containers, expansion);
    }

    // containers whose project is not (yet) listed stay visible here
    let standalone: Vec<Container> = containers
        .iter()
        .filter(|c| c.project().map_or(true, |p| !projects.contains_key(p)))
        .cloned()
        .collect();
    if !standalone.is_empty() {
        let header = Header {
            group: GroupKey::Standalone,
            running: standalone.iter().filter(|c| c.is_running()).count(),
            status: None,
        };
        push_group(&mut rows, header, &standalone, expansion);
    }

    rows
}

struct Header {
    group: GroupKey,
    running: usize,
    status: Option<ProjectStatus>,
}

fn push_group(
    rows: &mut Vec<TreeRow>,
    header: Header,
    containers: &[Container],
    expansion: &Expansion,
) {
    let Header {
        group,
        running,
        status,
    } = header;
    let expanded = expansion.is_expanded(&group);
    rows.push(TreeRow::Header {
        group: group.clone(),
        expanded,
        running,
        total: containers.len(),
        status,
    });
    if expanded {
        rows.extend(containers.iter().map(|c| TreeRow::Container {
            group: group.clone(),
            container: c.clone(),
            indent: 1,
        }));
    }
}

/// Next container row strictly after `from`
pub fn next_container_row(rows: &[TreeRow], from: usize) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(from + 1)
        .find(|(_, r)| !r.is_header())
        .map(|(i, _)| i)
}

/// Previous container row strictly before `from`
pub fn prev_container_row(rows: &[TreeRow], from: usize) -> Option<usize> {
    rows[..from.min(rows.len())]
        .iter()
        .rposition(|r| !r.is_header())
}

/// Index of a group's header row
pub fn header_row(rows: &[TreeRow], group: &GroupKey) -> Option<usize> {
    rows.iter()
        .position(|r| r.is_header() && r.group() == group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_runtime::{ComposeAssociation, ContainerState};

    fn container(id: &str, project: Option<&str>, state: ContainerState) -> Container {
        Container {
            id: id.to_string(),
            names: vec![id.to_string()],
            image: "img".to_string(),
            status: String::new(),
            state,
            usage: None,
            ports: String::new(),
            compose: project.map(|p| ComposeAssociation {
                project: p.to_string(),
                ..ComposeAssociation::default()
            }),
        }
    }

    fn fixture() -> (BTreeMap<String, ComposeProject>, Vec<Container>) {
        let a = container("a", Some("web"), ContainerState::Running);
        let b = container("b", Some("web"), ContainerState::Exited);
        let c = container("c", None, ContainerState::Running);
        let mut projects = BTreeMap::new();
        projects.insert("web".to_string(), ComposeProject::new("web", vec![a.clone(), b.clone()]));
        (projects, vec![a, b, c])
    }

    fn describe(rows: &[TreeRow]) -> Vec<String> {
        rows.iter()
            .map(|r| match r {
                TreeRow::Header { group, running, total, .. } => {
                    format!("header({},{}/{})", group.label(), running, total)
                }
                TreeRow::Container { container, .. } => container.id.clone(),
            })
            .collect()
    }

    #[test]
    fn test_flatten_project_then_standalone() {
        let (projects, containers) = fixture();
        let rows = build_tree(&projects, &containers, &Expansion::default());
        assert_eq!(
            describe(&rows),
            vec!["header(web,1/2)", "a", "b", "header(Standalone,1/1)", "c"]
        );
    }

    #[test]
    fn test_collapsed_project_hides_members() {
        let (projects, containers) = fixture();
        let mut expansion = Expansion::default();
        expansion.toggle(&GroupKey::Project("web".to_string()));
        let rows = build_tree(&projects, &containers, &expansion);
        assert_eq!(describe(&rows), vec!["header(web,1/2)", "header(Standalone,1/1)", "c"]);
        assert!(matches!(rows[0], TreeRow::Header { expanded: false, .. }));
    }

    #[test]
    fn test_project_headers_carry_status() {
        let (projects, containers) = fixture();
        let rows = build_tree(&projects, &containers, &Expansion::default());
        assert!(matches!(
            rows[0],
            TreeRow::Header {
                status: Some(ProjectStatus::SomeStopped),
                ..
            }
        ));
        assert!(matches!(rows[3], TreeRow::Header { status: None, .. }));
    }

    #[test]
    fn test_projects_sorted_by_name() {
        let mut projects = BTreeMap::new();
        for name in ["zeta", "alpha", "mid"] {
            let c = container(&format!("{}-1", name), Some(name), ContainerState::Running);
            projects.insert(name.to_string(), ComposeProject::new(name, vec![c]));
        }
        let rows = build_tree(&projects, &[], &Expansion::default());
        let headers: Vec<_> = rows
            .iter()
            .filter(|r| r.is_header())
            .map(|r| r.group().label().to_string())
            .collect();
        assert_eq!(headers, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_no_standalone_group_when_all_in_projects() {
        let (projects, containers) = fixture();
        let rows = build_tree(&projects, &containers[..2], &Expansion::default());
        assert!(rows.iter().all(|r| r.group() != &GroupKey::Standalone));
    }

    #[test]
    fn test_only_standalone() {
        let containers = vec![container("x", None, ContainerState::Exited)];
        let rows = build_tree(&BTreeMap::new(), &containers, &Expansion::default());
        assert_eq!(describe(&rows), vec!["header(Standalone,0/1)", "x"]);
    }

    #[test]
    fn test_navigation_skips_headers() {
        let (projects, containers) = fixture();
        let rows = build_tree(&projects, &containers, &Expansion::default());
        assert_eq!(next_container_row(&rows, 0), Some(1));
        assert_eq!(next_container_row(&rows, 2), Some(4));
        assert_eq!(next_container_row(&rows, 4), None);
        assert_eq!(prev_container_row(&rows, 4), Some(2));
        assert_eq!(prev_container_row(&rows, 1), None);
        assert_eq!(header_row(&rows, &GroupKey::Standalone), Some(3));
    }

    #[test]
    fn test_expansion_reset() {
        let mut expansion = Expansion::default();
        let group = GroupKey::Standalone;
        expansion.toggle(&group);
        assert!(!expansion.is_expanded(&group));
        expansion.reset();
        assert!(expansion.is_expanded(&group));
    }
}
