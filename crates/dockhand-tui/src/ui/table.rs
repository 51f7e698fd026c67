use super::*;
use crate::sort::SortColumn;
use crate::tree::TreeRow;

pub(super) fn draw_table(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT)
        .border_style(theme.border);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let mut lines = vec![header_line(app, theme)];

    if app.row_count() == 0 {
        let text = if app.loading {
            "Loading containers..."
        } else {
            "No containers found"
        };
        lines.push(Line::from(Span::styled(text, theme.muted)));
    } else {
        let start = app.page * app.page_size;
        let end = (start + app.page_size).min(app.row_count());
        for index in start..end {
            let selected = index == app.cursor;
            let mut line = match app.grouping {
                Grouping::Flat => container_line(app, theme, &app.containers[index], 0),
                Grouping::Compose => match &app.tree[index] {
                    TreeRow::Header {
                        group,
                        expanded,
                        running,
                        total,
                        status,
                    } => {
                        let marker = if *expanded { "▼" } else { "▶" };
                        let mut text =
                            format!("{} {} [{}/{} running]", marker, group.label(), running, total);
                        if let Some(status) = status {
                            text.push_str(&format!(" {}", status.label()));
                        }
                        Line::from(Span::styled(
                            fit_to_width(&text, usize::from(inner.width)),
                            theme.group,
                        ))
                    }
                    TreeRow::Container {
                        container, indent, ..
                    } => container_line(app, theme, container, *indent),
                },
            };
            if selected {
                for span in &mut line.spans {
                    span.style = span.style.patch(theme.selected);
                }
            }
            lines.push(line);
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn header_line(app: &App, theme: &Theme) -> Line<'static> {
    let spans: Vec<Span> = SortColumn::all()
        .iter()
        .map(|column| {
            let width = usize::from(app.column_widths[column.index()]);
            let label = if *column == app.sort.column {
                format!("{} {}", column.label(), app.sort.direction.arrow())
            } else {
                column.label().to_string()
            };
            let style = if app.mode == Mode::ColumnSelect && column.index() == app.column_cursor {
                theme.column_highlight
            } else {
                theme.header
            };
            Span::styled(fit_to_width(&label, width.saturating_sub(1)) + " ", style)
        })
        .collect();
    Line::from(spans)
}

/// Text of one cell; missing metrics render as a placeholder
pub(super) fn cell_text(container: &Container, column: SortColumn) -> String {
    let usage = container.usage.as_ref();
    let metric = |value: Option<&String>| match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => MISSING.to_string(),
    };
    match column {
        SortColumn::Id => container.short_id().to_string(),
        SortColumn::Name => container.name().to_string(),
        SortColumn::Memory => metric(usage.map(|u| &u.memory)),
        SortColumn::Cpu => metric(usage.map(|u| &u.cpu)),
        SortColumn::NetIo => metric(usage.map(|u| &u.net_io)),
        SortColumn::BlockIo => metric(usage.map(|u| &u.block_io)),
        SortColumn::Image => container.image.clone(),
        SortColumn::Status => container.status.clone(),
        SortColumn::Ports => container.ports.clone(),
    }
}

fn container_line(app: &App, theme: &Theme, container: &Container, indent: u8) -> Line<'static> {
    let spans: Vec<Span> = SortColumn::all()
        .iter()
        .map(|column| {
            let width = usize::from(app.column_widths[column.index()]);
            let mut text = cell_text(container, *column);
            if *column == SortColumn::Id && indent > 0 {
                text = format!("{}{}", "  ".repeat(usize::from(indent)), text);
            }
            // keep a gap between columns
            let cell = fit_to_width(&text, width.saturating_sub(1)) + " ";
            match column {
                SortColumn::Status => Span::styled(cell, theme.state(container.state)),
                _ => Span::raw(cell),
            }
        })
        .collect();
    Line::from(spans)
}
