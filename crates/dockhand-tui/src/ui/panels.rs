use super::*;

pub(super) fn draw_logs(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(panel) = &app.logs else {
        return;
    };
    let block = Block::default()
        .title(format!(" Logs: {} ", panel.name))
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(theme.border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = usize::from(inner.height);
    let width = usize::from(inner.width);
    let skip = panel.lines.len().saturating_sub(visible);

    let mut lines: Vec<Line> = Vec::new();
    if panel.lines.is_empty() {
        lines.push(Line::from(Span::styled("No log output", theme.muted)));
    }
    for raw in panel.lines.iter().skip(skip) {
        let cut = truncate_to_width(raw, width);
        match cut.into_text() {
            Ok(text) => lines.extend(text.lines),
            Err(_) => lines.push(Line::from(cut)),
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

pub(super) fn draw_info(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Info ")
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(theme.border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(container) = app.info_container() else {
        let gone = Paragraph::new(Span::styled("Container no longer listed", theme.muted));
        frame.render_widget(gone, inner);
        return;
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let (left, right) = info_fields(container);
    frame.render_widget(Paragraph::new(field_lines(&left, theme)), halves[0]);
    frame.render_widget(Paragraph::new(field_lines(&right, theme)), halves[1]);
}

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

type Fields = Vec<(&'static str, String)>;

/// Detail fields, split into identity (left) and metrics/compose (right)
pub(super) fn info_fields(container: &Container) -> (Fields, Fields) {
    let usage = container.usage.as_ref();
    let compose = container.compose.as_ref();
    let value = |v: Option<&String>| v.map_or(MISSING.to_string(), |v| or_missing(v));

    let left = vec![
        ("ID", or_missing(&container.id)),
        ("Name", or_missing(container.name())),
        ("Image", or_missing(&container.image)),
        ("Status", or_missing(&container.status)),
        ("State", container.state.to_string()),
        ("Ports", or_missing(&container.ports)),
    ];
    let right = vec![
        ("CPU", value(usage.map(|u| &u.cpu))),
        ("Memory", value(usage.map(|u| &u.memory))),
        ("Net I/O", value(usage.map(|u| &u.net_io))),
        ("Block I/O", value(usage.map(|u| &u.block_io))),
        ("Project", value(compose.map(|c| &c.project))),
        ("Service", value(compose.map(|c| &c.service))),
        ("Config", value(compose.map(|c| &c.config_files))),
        ("Workdir", value(compose.map(|c| &c.working_dir))),
    ];
    (left, right)
}

fn field_lines(fields: &[(&'static str, String)], theme: &Theme) -> Vec<Line<'static>> {
    fields
        .iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{:<10}", name), theme.header),
                Span::raw(value.clone()),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_runtime::{ContainerState, ResourceUsage};

    #[test]
    fn test_info_fields_mark_missing_values() {
        let container = Container {
            id: "abc".to_string(),
            names: vec!["web".to_string()],
            image: "nginx".to_string(),
            status: "Exited (0) 1 hour ago".to_string(),
            state: ContainerState::Exited,
            usage: None,
            ports: String::new(),
            compose: None,
        };
        let (left, right) = info_fields(&container);
        assert_eq!(left[5], ("Ports", MISSING.to_string()));
        assert!(right.iter().all(|(_, v)| v == MISSING));
    }

    #[test]
    fn test_info_fields_show_metrics() {
        let container = Container {
            id: "abc".to_string(),
            names: vec!["web".to_string()],
            image: "nginx".to_string(),
            status: "Up 1 minute".to_string(),
            state: ContainerState::Running,
            usage: Some(ResourceUsage {
                cpu: "1.5%".to_string(),
                memory: "3%".to_string(),
                net_io: "1kB / 2kB".to_string(),
                block_io: String::new(),
            }),
            ports: "0.0.0.0:80->80/tcp".to_string(),
            compose: None,
        };
        let (_, right) = info_fields(&container);
        assert_eq!(right[0].1, "1.5%");
        assert_eq!(right[3].1, MISSING);
    }
}
