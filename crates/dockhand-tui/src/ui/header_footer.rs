use super::*;
use std::time::Duration;

const METER_WIDTH: usize = 30;

pub(super) fn draw_title(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let mut spans = vec![
        Span::styled(" dockhand ", theme.title),
        Span::styled("│ ", theme.muted),
        Span::raw(app.runtime.to_string()),
        Span::styled(" │ ", theme.muted),
        Span::raw(clock),
    ];
    if app.loading {
        spans.push(Span::styled("  ⟳ refreshing", theme.notice));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub(super) fn draw_meters(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let (running, stopped) = app.state_counts();
    let total = running + stopped;

    let running_line = Line::from(vec![
        Span::raw(" Running "),
        meter(running, total, theme.meter_running),
        Span::raw(format!(" {:<4}", running)),
        Span::styled("Total: ", theme.muted),
        Span::raw(total.to_string()),
    ]);
    let stopped_line = Line::from(vec![
        Span::raw(" Stopped "),
        meter(stopped, total, theme.meter_stopped),
        Span::raw(format!(" {:<4}", stopped)),
        Span::styled("Uptime: ", theme.muted),
        Span::raw(format_uptime(app.uptime())),
        Span::styled("  Refresh: ", theme.muted),
        Span::raw(format!("{}s", app.poll_interval().as_secs())),
    ]);

    frame.render_widget(Paragraph::new(vec![running_line, stopped_line]), area);
}

fn meter(count: usize, total: usize, style: Style) -> Span<'static> {
    let filled = if total == 0 {
        0
    } else {
        (count * METER_WIDTH).div_ceil(total).min(METER_WIDTH)
    };
    Span::styled(
        format!("[{}{}]", "|".repeat(filled), " ".repeat(METER_WIDTH - filled)),
        style,
    )
}

pub(super) fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub(super) fn draw_page_line(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut text = format!(
        " Page {}/{}  {} containers",
        app.page + 1,
        app.page_count(),
        app.containers.len()
    );
    if app.grouping == Grouping::Compose {
        text.push_str(&format!("  {} projects", app.projects.len()));
    }
    text.push_str(&format!(
        "  Sort: {} {}",
        app.sort.column.label(),
        app.sort.direction.arrow()
    ));
    frame.render_widget(Paragraph::new(Span::styled(text, theme.muted)), area);
}

pub(super) fn draw_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(notice) = &app.status else {
        return;
    };
    let style = if notice.text.starts_with("Error") || notice.text.starts_with("Logs error") {
        theme.error
    } else {
        theme.notice
    };
    let text = truncate_to_width(&format!(" {}", notice.text), usize::from(area.width));
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
}

/// Key hints for the current mode
pub(super) fn footer_hints(app: &App) -> &'static [(&'static str, &'static str)] {
    match app.mode {
        Mode::ColumnSelect => &[("←/→", "Column"), ("Enter", "Sort"), ("Tab/Esc", "Done")],
        Mode::Settings => &[
            ("↑/↓", "Select"),
            ("←/→", "Adjust"),
            ("Enter", "Apply"),
            ("s", "Save"),
            ("Esc", "Cancel"),
        ],
        Mode::Help => &[("Esc", "Close")],
        Mode::Logs | Mode::Info => &[("↑/↓", "Move"), ("l/i", "Toggle panel"), ("Esc", "Close"), ("q", "Quit")],
        Mode::ComposeView => &[
            ("↑/↓", "Move"),
            ("Enter", "Expand"),
            ("s/x/r/d", "Start/Stop/Restart/Remove"),
            ("c", "Flat view"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Mode::Normal => &[
            ("↑/↓", "Move"),
            ("←/→", "Page"),
            ("s/x/r/d", "Start/Stop/Restart/Remove"),
            ("e", "Exec"),
            ("l", "Logs"),
            ("i", "Info"),
            ("c", "Compose"),
            ("Tab", "Sort"),
            ("F2", "Settings"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    }
}

pub(super) fn draw_footer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(format!(" {} ", app.mode.label()), theme.column_highlight)];
    for (key, action) in footer_hints(app) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*key, theme.key));
        spans.push(Span::raw(format!(" {}", action)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
