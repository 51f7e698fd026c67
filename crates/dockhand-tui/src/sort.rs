//! Container sort keys and ordering

use dockhand_runtime::Container;
use std::cmp::Ordering;

/// Table columns, which double as sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Name,
    Memory,
    Cpu,
    NetIo,
    BlockIo,
    Image,
    Status,
    Ports,
}

impl SortColumn {
    pub fn all() -> &'static [SortColumn] {
        &[
            SortColumn::Id,
            SortColumn::Name,
            SortColumn::Memory,
            SortColumn::Cpu,
            SortColumn::NetIo,
            SortColumn::BlockIo,
            SortColumn::Image,
            SortColumn::Status,
            SortColumn::Ports,
        ]
    }

    pub fn from_index(index: usize) -> Option<SortColumn> {
        Self::all().get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            SortColumn::Id => 0,
            SortColumn::Name => 1,
            SortColumn::Memory => 2,
            SortColumn::Cpu => 3,
            SortColumn::NetIo => 4,
            SortColumn::BlockIo => 5,
            SortColumn::Image => 6,
            SortColumn::Status => 7,
            SortColumn::Ports => 8,
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::Name => "NAME",
            SortColumn::Memory => "MEMORY",
            SortColumn::Cpu => "CPU",
            SortColumn::NetIo => "NET I/O",
            SortColumn::BlockIo => "DISK I/O",
            SortColumn::Image => "IMAGE",
            SortColumn::Status => "STATUS",
            SortColumn::Ports => "PORTS",
        }
    }

    /// Ascending comparison of two containers on this key
    pub fn compare(&self, a: &Container, b: &Container) -> Ordering {
        match self {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::Name => cmp_ignore_case(a.name(), b.name()),
            SortColumn::Memory => a.memory_percent().total_cmp(&b.memory_percent()),
            SortColumn::Cpu => a.cpu_percent().total_cmp(&b.cpu_percent()),
            SortColumn::NetIo => a.net_io_bytes().total_cmp(&b.net_io_bytes()),
            SortColumn::BlockIo => a.block_io_bytes().total_cmp(&b.block_io_bytes()),
            SortColumn::Image => cmp_ignore_case(&a.image, &b.image),
            SortColumn::Status => cmp_ignore_case(&a.status, &b.status),
            SortColumn::Ports => cmp_ignore_case(&a.ports, &b.ports),
        }
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort key and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: SortColumn::Status,
            direction: SortDirection::Descending,
        }
    }
}

impl SortOrder {
    /// Select a column: the active column flips direction, any other starts ascending
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Stable sort of a container slice
    pub fn apply(&self, containers: &mut [Container]) {
        let column = self.column;
        match self.direction {
            SortDirection::Ascending => containers.sort_by(|a, b| column.compare(a, b)),
            SortDirection::Descending => containers.sort_by(|a, b| column.compare(b, a)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_runtime::{ContainerState, ResourceUsage};

    fn container(id: &str, name: &str, cpu: &str, net: &str) -> Container {
        Container {
            id: id.to_string(),
            names: vec![name.to_string()],
            image: format!("{}-image", name),
            status: "Up 1 minute".to_string(),
            state: ContainerState::Running,
            usage: Some(ResourceUsage {
                cpu: cpu.to_string(),
                memory: "1%".to_string(),
                net_io: net.to_string(),
                block_io: "0B / 0B".to_string(),
            }),
            ports: String::new(),
            compose: None,
        }
    }

    fn ids(containers: &[Container]) -> Vec<&str> {
        containers.iter().map(|c| c.id.as_str()).collect()
    }

    fn sample() -> Vec<Container> {
        vec![
            container("c", "beta", "10%", "1kB / 1kB"),
            container("a", "Alpha", "2.5%", "3MB / 0B"),
            container("b", "gamma", "30%", "850B / 1.2kB"),
        ]
    }

    #[test]
    fn test_default_sort_is_status_descending() {
        let order = SortOrder::default();
        assert_eq!(order.column, SortColumn::Status);
        assert_eq!(order.direction, SortDirection::Descending);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let mut list = sample();
        let order = SortOrder {
            column: SortColumn::Name,
            direction: SortDirection::Ascending,
        };
        order.apply(&mut list);
        assert_eq!(ids(&list), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_cpu_sort_is_numeric() {
        let mut list = sample();
        let order = SortOrder {
            column: SortColumn::Cpu,
            direction: SortDirection::Ascending,
        };
        order.apply(&mut list);
        assert_eq!(ids(&list), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_net_io_sort_sums_both_sides() {
        let mut list = sample();
        let order = SortOrder {
            column: SortColumn::NetIo,
            direction: SortDirection::Descending,
        };
        order.apply(&mut list);
        // 3MB, 2.05kB, 2kB
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_selecting_twice_reverses_order() {
        let mut order = SortOrder::default();
        order.select(SortColumn::Cpu);
        assert_eq!(order.direction, SortDirection::Ascending);
        let mut once = sample();
        order.apply(&mut once);

        order.select(SortColumn::Cpu);
        assert_eq!(order.direction, SortDirection::Descending);
        let mut twice = sample();
        order.apply(&mut twice);

        let mut reversed = ids(&once);
        reversed.reverse();
        assert_eq!(ids(&twice), reversed);
    }

    #[test]
    fn test_selecting_other_column_resets_to_ascending() {
        let mut order = SortOrder::default();
        order.select(SortColumn::Name);
        order.select(SortColumn::Name);
        assert_eq!(order.direction, SortDirection::Descending);

        order.select(SortColumn::Image);
        assert_eq!(order.column, SortColumn::Image);
        assert_eq!(order.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_missing_metrics_sort_as_zero() {
        let mut list = sample();
        list[0].usage = None;
        let order = SortOrder {
            column: SortColumn::Cpu,
            direction: SortDirection::Ascending,
        };
        order.apply(&mut list);
        assert_eq!(list[0].id, "c");
    }

    #[test]
    fn test_column_index_round_trip() {
        for (i, column) in SortColumn::all().iter().enumerate() {
            assert_eq!(column.index(), i);
            assert_eq!(SortColumn::from_index(i), Some(*column));
        }
        assert_eq!(SortColumn::from_index(9), None);
    }
}
