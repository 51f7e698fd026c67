use super::*;
use crate::settings::{SettingsEditor, SettingsRow};

const HELP_KEYS: &[(&str, &str)] = &[
    ("↑/k  ↓/j", "Move cursor"),
    ("←/PgUp/p  →/PgDn/n", "Previous / next page"),
    ("s  x  r  d", "Start / stop / restart / remove"),
    ("e", "Open a shell in the container"),
    ("l", "Toggle logs panel"),
    ("i", "Toggle info panel"),
    ("c", "Toggle compose view"),
    ("Enter/Space", "Expand or collapse project (compose view)"),
    ("Tab", "Column select; Enter sorts"),
    ("F2", "Settings"),
    ("F5", "Refresh now"),
    ("?/F1", "This help"),
    ("Esc", "Close panel / back"),
    ("q/F10/Ctrl-C", "Quit"),
];

pub(super) fn draw_help(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Help ")
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(theme.border);

    let lines: Vec<Line> = HELP_KEYS
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<22}", key), theme.key),
                Span::raw(*action),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub(super) fn draw_settings(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(editor) = &app.settings_editor else {
        return;
    };
    let block = Block::default()
        .title(" Settings ")
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(theme.border);

    let mut lines: Vec<Line> = (0..SettingsRow::COUNT)
        .map(|index| {
            let row = SettingsRow::from_index(index);
            let text = format!(" {:<22}{}", row.label(), row_value(editor, row));
            let style = if index == editor.selected {
                theme.selected
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let total: u16 = editor.draft.layout.percents().iter().sum();
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!(" Column total: {}% (normalized to 100% on exit)", total),
        theme.muted,
    )));
    if editor.runtime_changed() {
        lines.push(Line::from(Span::styled(
            " Runtime change takes effect on restart",
            theme.notice,
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn row_value(editor: &SettingsEditor, row: SettingsRow) -> String {
    let draft = &editor.draft;
    match row {
        SettingsRow::Column(i) => format!("{}%", draft.layout.percents()[i]),
        SettingsRow::RefreshInterval => format!("{}s", draft.performance.poll_rate),
        SettingsRow::Runtime => draft.runtime.kind.to_string(),
        SettingsRow::Shell => draft.exec.shell.clone(),
    }
}
