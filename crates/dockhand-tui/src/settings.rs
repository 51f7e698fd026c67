//! Settings editor state
//!
//! The editor works on a draft copy of the settings. Leaving it either
//! applies the draft or restores the snapshot taken on entry; both paths
//! normalize the column percentages.

use crate::sort::SortColumn;
use crossterm::event::{KeyCode, KeyEvent};
use dockhand_config::{LayoutConfig, Settings, COLUMN_COUNT, MAX_POLL_RATE, MIN_POLL_RATE, SHELL_OPTIONS};

const MIN_PERCENT: u16 = 1;
const MAX_PERCENT: u16 = 100;

/// One editable line of the settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    /// Width percentage of a table column
    Column(usize),
    RefreshInterval,
    Runtime,
    Shell,
}

impl SettingsRow {
    pub const COUNT: usize = COLUMN_COUNT + 3;

    pub fn from_index(index: usize) -> SettingsRow {
        match index {
            i if i < COLUMN_COUNT => SettingsRow::Column(i),
            i if i == COLUMN_COUNT => SettingsRow::RefreshInterval,
            i if i == COLUMN_COUNT + 1 => SettingsRow::Runtime,
            _ => SettingsRow::Shell,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SettingsRow::Column(i) => {
                let heading = SortColumn::from_index(*i).map_or("?", |c| c.label());
                format!("{} width", heading)
            }
            SettingsRow::RefreshInterval => "Refresh interval".to_string(),
            SettingsRow::Runtime => "Runtime".to_string(),
            SettingsRow::Shell => "Exec shell".to_string(),
        }
    }
}

/// How a key press left the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    Continue,
    /// Keep the draft for this session
    Apply,
    /// Keep the draft and write it to disk
    Save,
    /// Discard the draft
    Cancel,
}

#[derive(Debug, Clone)]
pub struct SettingsEditor {
    pub draft: Settings,
    original: Settings,
    pub selected: usize,
}

impl SettingsEditor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            draft: settings.clone(),
            original: settings.clone(),
            selected: 0,
        }
    }

    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::from_index(self.selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SettingsOutcome {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(SettingsRow::COUNT - 1);
            }
            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => self.adjust(false),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('l') => self.adjust(true),
            KeyCode::Enter | KeyCode::F(2) => return SettingsOutcome::Apply,
            KeyCode::Char('s') => return SettingsOutcome::Save,
            KeyCode::Esc => return SettingsOutcome::Cancel,
            _ => {}
        }
        SettingsOutcome::Continue
    }

    fn adjust(&mut self, up: bool) {
        match self.selected_row() {
            SettingsRow::Column(i) => {
                let mut percents = self.draft.layout.percents();
                percents[i] = if up {
                    (percents[i] + 1).min(MAX_PERCENT)
                } else {
                    percents[i].saturating_sub(1).max(MIN_PERCENT)
                };
                self.draft.layout = LayoutConfig::from_percents(percents);
            }
            SettingsRow::RefreshInterval => {
                let rate = &mut self.draft.performance.poll_rate;
                *rate = if up {
                    (*rate + 1).min(MAX_POLL_RATE)
                } else {
                    rate.saturating_sub(1).max(MIN_POLL_RATE)
                };
            }
            SettingsRow::Runtime => {
                self.draft.runtime.kind = self.draft.runtime.kind.toggled();
            }
            SettingsRow::Shell => {
                let current = SHELL_OPTIONS
                    .iter()
                    .position(|s| *s == self.draft.exec.shell)
                    .unwrap_or(0);
                let len = SHELL_OPTIONS.len();
                let next = if up {
                    (current + 1) % len
                } else {
                    (current + len - 1) % len
                };
                self.draft.exec.shell = SHELL_OPTIONS[next].to_string();
            }
        }
    }

    /// Whether the draft switches runtime, which only applies after a restart
    pub fn runtime_changed(&self) -> bool {
        self.draft.runtime.kind != self.original.runtime.kind
    }

    /// Settings to keep after leaving with `outcome`
    pub fn finish(self, outcome: SettingsOutcome) -> Settings {
        let mut settings = match outcome {
            SettingsOutcome::Cancel => self.original,
            _ => self.draft,
        };
        settings.layout.normalize();
        settings
    }
}
