//! UI rendering for the TUI application

mod dialogs;
mod header_footer;
mod panels;
mod table;
mod theme;

pub use theme::Theme;

use crate::app::{App, Grouping, Mode};
use crate::layout::{fit_to_width, truncate_to_width};
use ansi_to_tui::IntoText;
use dockhand_runtime::Container;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use dialogs::*;
use header_footer::*;
use panels::*;
use table::*;

/// Placeholder for values that are not available
const MISSING: &str = "─";

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                  // Title
            Constraint::Length(2),                  // Meters
            Constraint::Length(1),                  // Spacer
            Constraint::Min(0),                     // Table header + rows
            Constraint::Length(app.panel_height()), // Logs or info
            Constraint::Length(1),                  // Page line
            Constraint::Length(1),                  // Status
            Constraint::Length(1),                  // Footer
        ])
        .split(area);

    draw_title(frame, app, theme, chunks[0]);
    draw_meters(frame, app, theme, chunks[1]);
    draw_table(frame, app, theme, chunks[3]);

    match app.mode {
        Mode::Logs => draw_logs(frame, app, theme, chunks[4]),
        Mode::Info => draw_info(frame, app, theme, chunks[4]),
        _ => {}
    }

    draw_page_line(frame, app, theme, chunks[5]);
    draw_status(frame, app, theme, chunks[6]);
    draw_footer(frame, app, theme, chunks[7]);

    match app.mode {
        Mode::Help => {
            let popup = popup_rect(60, 80, 52, 24, area);
            frame.render_widget(Clear, popup);
            draw_help(frame, theme, popup);
        }
        Mode::Settings => {
            let popup = popup_rect(60, 70, 56, 18, area);
            frame.render_widget(Clear, popup);
            draw_settings(frame, app, theme, popup);
        }
        _ => {}
    }
}

/// Center a `width` x `height` rectangle in `area`
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Calculate a popup rectangle centered in the given area with percentage-based sizing and minimums
fn popup_rect(pct_w: u16, pct_h: u16, min_w: u16, min_h: u16, area: Rect) -> Rect {
    let w = ((area.width as u32 * pct_w as u32) / 100) as u16;
    let h = ((area.height as u32 * pct_h as u32) / 100) as u16;
    let w = w.max(min_w).min(area.width);
    let h = h.max(min_h).min(area.height);
    centered_rect(w, h, area)
}
