use dockhand_runtime::ContainerState;
use ratatui::style::{Color, Modifier, Style};

/// Styles used by the renderer, built once and passed to `draw`
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub border: Style,
    pub selected: Style,
    pub column_highlight: Style,
    pub group: Style,
    pub muted: Style,
    pub notice: Style,
    pub error: Style,
    pub key: Style,
    pub meter_running: Style,
    pub meter_stopped: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::Cyan),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            column_highlight: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            group: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            notice: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            key: Style::default().fg(Color::Yellow),
            meter_running: Style::default().fg(Color::Green),
            meter_stopped: Style::default().fg(Color::Red),
        }
    }
}

impl Theme {
    pub fn state(&self, state: ContainerState) -> Style {
        match state {
            ContainerState::Running => Style::default().fg(Color::Green),
            ContainerState::Paused => Style::default().fg(Color::Yellow),
            ContainerState::Restarting => Style::default().fg(Color::Blue),
            ContainerState::Exited => Style::default().fg(Color::Red),
            ContainerState::Created => Style::default().fg(Color::Cyan),
            ContainerState::Unknown => Style::default().fg(Color::DarkGray),
        }
    }
}
