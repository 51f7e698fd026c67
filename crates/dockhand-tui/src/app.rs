//! Main TUI application state and logic
//!
//! `App::update` is the only place state changes. It consumes one
//! [`Message`] and returns the [`Command`]s to run; it never performs I/O.

use crate::layout::{
    self, allocate_columns, clamp_cursor, page_count, page_of, usable_width, INFO_PANEL_HEIGHT,
    LOGS_PANEL_HEIGHT,
};
use crate::message::{Command, Message};
use crate::settings::{SettingsEditor, SettingsOutcome};
use crate::sort::{SortColumn, SortOrder};
use crate::tree::{self, build_tree, Expansion, TreeRow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dockhand_config::{Settings, COLUMN_COUNT};
use dockhand_runtime::{ActionVerb, ComposeProject, Container, RuntimeKind};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Ticks a status notice survives without a key press
const NOTICE_TICKS: u8 = 3;

/// Active UI mode; exactly one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    ColumnSelect,
    Logs,
    Info,
    Settings,
    ComposeView,
    Help,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::ColumnSelect => "COLUMN",
            Mode::Logs => "LOGS",
            Mode::Info => "INFO",
            Mode::Settings => "SETTINGS",
            Mode::ComposeView => "COMPOSE",
            Mode::Help => "HELP",
        }
    }

    /// Periodic refresh is held while these modes are open
    pub fn suspends_ticks(&self) -> bool {
        matches!(self, Mode::Settings | Mode::Help)
    }
}

/// Which collection the table renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Flat,
    Compose,
}

/// Transient status line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub text: String,
    ticks_left: u8,
}

/// Logs panel contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsPanel {
    pub target: String,
    pub name: String,
    pub lines: Vec<String>,
}

/// Application state
pub struct App {
    pub runtime: RuntimeKind,
    pub settings: Settings,
    /// Flat container list, in sort order
    pub containers: Vec<Container>,
    /// Compose projects by name; members in sort order
    pub projects: BTreeMap<String, ComposeProject>,
    pub expansion: Expansion,
    /// Flattened compose tree
    pub tree: Vec<TreeRow>,
    pub cursor: usize,
    pub page: usize,
    pub page_size: usize,
    pub mode: Mode,
    pub grouping: Grouping,
    pub sort: SortOrder,
    /// Highlighted column in column-select mode
    pub column_cursor: usize,
    pub status: Option<StatusNotice>,
    pub loading: bool,
    pub width: u16,
    pub height: u16,
    pub column_widths: [u16; COLUMN_COUNT],
    pub logs: Option<LogsPanel>,
    pub info_target: Option<String>,
    pub settings_editor: Option<SettingsEditor>,
    pub started_at: Instant,
    /// Only ticks scheduled under this generation are live
    pub tick_generation: u64,
    pub should_quit: bool,
}

impl App {
    pub fn new(settings: Settings, runtime: RuntimeKind, width: u16, height: u16) -> Self {
        let mut app = Self {
            runtime,
            settings,
            containers: Vec::new(),
            projects: BTreeMap::new(),
            expansion: Expansion::default(),
            tree: Vec::new(),
            cursor: 0,
            page: 0,
            page_size: 1,
            mode: Mode::Normal,
            grouping: Grouping::Flat,
            sort: SortOrder::default(),
            column_cursor: SortOrder::default().column.index(),
            status: None,
            loading: true,
            width,
            height,
            column_widths: [0; COLUMN_COUNT],
            logs: None,
            info_target: None,
            settings_editor: None,
            started_at: Instant::now(),
            tick_generation: 0,
            should_quit: false,
        };
        app.recompute_layout();
        app
    }

    /// Commands to run before the first message
    pub fn init(&self) -> Vec<Command> {
        vec![Command::FetchContainers, self.tick_command()]
    }

    pub fn poll_interval(&self) -> Duration {
        self.settings.poll_interval()
    }

    /// Apply one message and return the commands it triggers
    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        let commands = match msg {
            Message::Key(key) => self.on_key(key),
            Message::Resize(width, height) => {
                self.width = width;
                self.height = height;
                Vec::new()
            }
            Message::Tick(generation) => self.on_tick(generation),
            Message::ContainersLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(mut containers) => {
                        self.sort.apply(&mut containers);
                        self.containers = containers;
                        self.rebuild_tree();
                    }
                    Err(e) => {
                        tracing::warn!("Container refresh failed: {}", e);
                        self.notify(format!("Error fetching containers: {}", e));
                    }
                }
                Vec::new()
            }
            Message::ComposeProjectsLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(mut projects) => {
                        for project in projects.values_mut() {
                            self.sort.apply(&mut project.containers);
                        }
                        self.projects = projects;
                        self.rebuild_tree();
                    }
                    Err(e) => {
                        tracing::warn!("Compose refresh failed: {}", e);
                        self.notify(format!("Error fetching compose projects: {}", e));
                    }
                }
                Vec::new()
            }
            Message::LogsLoaded { id, result } => {
                self.on_logs(id, result);
                Vec::new()
            }
            Message::ActionDone { verb, id, result } => {
                match result {
                    Ok(()) => {
                        tracing::info!("{} {} succeeded", verb, id);
                        self.notify("Action completed successfully");
                    }
                    Err(e) => {
                        tracing::warn!("{} {} failed: {}", verb, id, e);
                        self.notify(format!("Error: {}", e));
                    }
                }
                self.refresh_commands()
            }
            Message::ShellExited(result) => {
                match result {
                    Ok(()) => self.notify("Shell session ended"),
                    Err(e) => self.notify(format!("Error: {}", e)),
                }
                self.refresh_commands()
            }
            Message::SettingsSaved(result) => {
                match result {
                    Ok(()) => self.notify("Settings saved"),
                    Err(e) => self.notify(format!("Error: {}", e)),
                }
                Vec::new()
            }
        };
        self.recompute_layout();
        commands
    }

    // ==================== timer ====================

    fn tick_command(&self) -> Command {
        Command::Tick {
            interval: self.poll_interval(),
            generation: self.tick_generation,
        }
    }

    /// Tick chain is dropped while a suspending mode is open
    fn on_tick(&mut self, generation: u64) -> Vec<Command> {
        if generation != self.tick_generation {
            tracing::debug!("Dropping stale tick {} (current {})", generation, self.tick_generation);
            return Vec::new();
        }
        if self.mode.suspends_ticks() {
            return Vec::new();
        }

        let mut commands = vec![self.tick_command()];

        if let Some(notice) = &mut self.status {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.status = None;
            }
        }

        commands.extend(self.refresh_commands());
        if let Some(logs) = &self.logs {
            commands.push(Command::FetchLogs(logs.target.clone()));
        }
        commands
    }

    /// Start a fresh tick chain at the current interval and refresh now.
    ///
    /// Any tick still in flight belongs to the old generation and is ignored.
    fn resume_ticks(&mut self) -> Vec<Command> {
        self.tick_generation = self.tick_generation.wrapping_add(1);
        let mut commands = vec![self.tick_command()];
        commands.extend(self.refresh_commands());
        commands
    }

    fn refresh_commands(&mut self) -> Vec<Command> {
        self.loading = true;
        let mut commands = vec![Command::FetchContainers];
        if self.grouping == Grouping::Compose {
            commands.push(Command::FetchComposeProjects);
        }
        commands
    }

    fn on_logs(&mut self, id: String, result: Result<Vec<String>, dockhand_runtime::RuntimeError>) {
        let Some(panel) = self.logs.as_mut().filter(|p| p.target == id) else {
            tracing::debug!("Dropping logs for {}: panel closed or retargeted", id);
            return;
        };
        match result {
            Ok(lines) => panel.lines = lines,
            Err(e) => {
                tracing::warn!("Logs for {} failed: {}", id, e);
                self.set_mode(self.home_mode());
                self.notify(format!("Logs error: {}", e));
            }
        }
    }

    // ==================== keys ====================

    fn on_key(&mut self, key: KeyEvent) -> Vec<Command> {
        self.status = None;

        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        let quit_key = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'));
        if ctrl_c || key.code == KeyCode::F(10) || (quit_key && self.mode != Mode::Settings) {
            self.should_quit = true;
            return Vec::new();
        }

        match self.mode {
            Mode::Settings => self.on_settings_key(key),
            Mode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
                    self.set_mode(self.home_mode());
                    return self.resume_ticks();
                }
                Vec::new()
            }
            Mode::ColumnSelect => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.column_cursor = self.column_cursor.saturating_sub(1);
                    Vec::new()
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.column_cursor = (self.column_cursor + 1).min(COLUMN_COUNT - 1);
                    Vec::new()
                }
                KeyCode::Enter => {
                    if let Some(column) = SortColumn::from_index(self.column_cursor) {
                        self.sort_by(column);
                    }
                    Vec::new()
                }
                KeyCode::Tab | KeyCode::Esc => {
                    self.set_mode(self.home_mode());
                    Vec::new()
                }
                _ => self.on_list_key(key),
            },
            _ => self.on_list_key(key),
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let Some(editor) = self.settings_editor.as_mut() else {
            self.set_mode(self.home_mode());
            return self.resume_ticks();
        };
        let outcome = editor.handle_key(key);
        if outcome == SettingsOutcome::Continue {
            return Vec::new();
        }

        let Some(editor) = self.settings_editor.take() else {
            return Vec::new();
        };
        let runtime_changed = outcome != SettingsOutcome::Cancel && editor.runtime_changed();
        self.settings = editor.finish(outcome);
        self.set_mode(self.home_mode());

        if runtime_changed {
            self.notify(format!(
                "Runtime set to {} (takes effect on restart)",
                self.settings.runtime.kind
            ));
        }
        let mut commands = Vec::new();
        if outcome == SettingsOutcome::Save {
            commands.push(Command::SaveSettings(self.settings.clone()));
        }
        commands.extend(self.resume_ticks());
        commands
    }

    /// Keys shared by the list modes (Normal, ComposeView, Logs, Info, ColumnSelect)
    fn on_list_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => self.prev_page(),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => self.next_page(),
            KeyCode::Char('s') => return self.action(ActionVerb::Start),
            KeyCode::Char('x') => return self.action(ActionVerb::Stop),
            KeyCode::Char('r') => return self.action(ActionVerb::Restart),
            KeyCode::Char('d') => return self.action(ActionVerb::Remove),
            KeyCode::Char('e') => return self.exec(),
            KeyCode::Char('l') => return self.toggle_logs(),
            KeyCode::Char('i') => self.toggle_info(),
            KeyCode::Char('c') => return self.toggle_compose(),
            KeyCode::Enter | KeyCode::Char(' ') if self.grouping == Grouping::Compose => {
                self.toggle_group();
            }
            KeyCode::Tab => {
                self.column_cursor = self.sort.column.index();
                self.set_mode(Mode::ColumnSelect);
            }
            KeyCode::F(2) => {
                self.settings_editor = Some(SettingsEditor::new(&self.settings));
                self.set_mode(Mode::Settings);
            }
            KeyCode::Char('?') | KeyCode::F(1) => self.set_mode(Mode::Help),
            KeyCode::F(5) => return self.refresh_commands(),
            KeyCode::Char('`') => self.debug_snapshot(),
            KeyCode::Esc => self.set_mode(self.home_mode()),
            _ => {}
        }
        Vec::new()
    }

    // ==================== modes ====================

    /// Mode returned to by Esc and by closing a panel
    pub fn home_mode(&self) -> Mode {
        match self.grouping {
            Grouping::Compose => Mode::ComposeView,
            Grouping::Flat => Mode::Normal,
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode != Mode::Logs {
            self.logs = None;
        }
        if mode != Mode::Info {
            self.info_target = None;
        }
        if mode != Mode::Settings {
            self.settings_editor = None;
        }
        self.mode = mode;
    }

    fn toggle_logs(&mut self) -> Vec<Command> {
        if self.mode == Mode::Logs {
            self.set_mode(self.home_mode());
            return Vec::new();
        }
        let Some(container) = self.selected_container() else {
            self.notify("No container selected");
            return Vec::new();
        };
        let panel = LogsPanel {
            target: container.id.clone(),
            name: container.name().to_string(),
            lines: Vec::new(),
        };
        let id = panel.target.clone();
        self.set_mode(Mode::Logs);
        self.logs = Some(panel);
        vec![Command::FetchLogs(id)]
    }

    fn toggle_info(&mut self) {
        if self.mode == Mode::Info {
            self.set_mode(self.home_mode());
            return;
        }
        let Some(id) = self.selected_container().map(|c| c.id.clone()) else {
            self.notify("No container selected");
            return;
        };
        self.set_mode(Mode::Info);
        self.info_target = Some(id);
    }

    fn toggle_compose(&mut self) -> Vec<Command> {
        self.cursor = 0;
        self.page = 0;
        match self.grouping {
            Grouping::Compose => {
                self.grouping = Grouping::Flat;
                self.set_mode(Mode::Normal);
                Vec::new()
            }
            Grouping::Flat => {
                self.grouping = Grouping::Compose;
                self.expansion.reset();
                self.rebuild_tree();
                self.set_mode(Mode::ComposeView);
                self.loading = true;
                vec![Command::FetchComposeProjects]
            }
        }
    }

    /// Expand or collapse the group under the cursor, landing on its header
    fn toggle_group(&mut self) {
        let Some(group) = self.tree.get(self.cursor).map(|r| r.group().clone()) else {
            return;
        };
        self.expansion.toggle(&group);
        self.rebuild_tree();
        if let Some(header) = tree::header_row(&self.tree, &group) {
            self.cursor = header;
        }
    }

    fn sort_by(&mut self, column: SortColumn) {
        self.sort.select(column);
        self.sort.apply(&mut self.containers);
        for project in self.projects.values_mut() {
            self.sort.apply(&mut project.containers);
        }
        self.rebuild_tree();
        self.notify(format!(
            "Sorted by {} ({})",
            column.label(),
            self.sort.direction.label()
        ));
    }

    // ==================== actions ====================

    fn action(&mut self, verb: ActionVerb) -> Vec<Command> {
        let Some(container) = self.selected_container() else {
            self.notify("No container selected");
            return Vec::new();
        };
        let id = container.id.clone();
        let text = format!("{} {}...", verb.progress_label(), container.name());
        self.notify(text);
        vec![Command::PerformAction(verb, id)]
    }

    fn exec(&mut self) -> Vec<Command> {
        let Some(container) = self.selected_container() else {
            self.notify("No container selected");
            return Vec::new();
        };
        if !container.is_running() {
            let text = format!("{} is not running", container.name());
            self.notify(text);
            return Vec::new();
        }
        vec![Command::OpenShell {
            id: container.id.clone(),
            shell: self.settings.exec.shell.clone(),
        }]
    }

    fn debug_snapshot(&self) {
        tracing::info!(
            "snapshot: mode={:?} grouping={:?} cursor={} page={}/{} containers={} projects={} sort={}:{}",
            self.mode,
            self.grouping,
            self.cursor,
            self.page,
            self.page_count(),
            self.containers.len(),
            self.projects.len(),
            self.sort.column.label(),
            self.sort.direction.label()
        );
    }

    // ==================== navigation ====================

    /// Rows in the collection the table currently renders
    pub fn row_count(&self) -> usize {
        match self.grouping {
            Grouping::Flat => self.containers.len(),
            Grouping::Compose => self.tree.len(),
        }
    }

    pub fn page_count(&self) -> usize {
        page_count(self.row_count(), self.page_size)
    }

    /// Container under the cursor; `None` on a group header or an empty list
    pub fn selected_container(&self) -> Option<&Container> {
        match self.grouping {
            Grouping::Flat => self.containers.get(self.cursor),
            Grouping::Compose => self.tree.get(self.cursor).and_then(TreeRow::container),
        }
    }

    /// Container shown in the info panel, looked up fresh each time
    pub fn info_container(&self) -> Option<&Container> {
        let id = self.info_target.as_deref()?;
        self.containers.iter().find(|c| c.id == id).or_else(|| {
            self.projects
                .values()
                .flat_map(|p| p.containers.iter())
                .find(|c| c.id == id)
        })
    }

    fn move_up(&mut self) {
        match self.grouping {
            Grouping::Flat => self.cursor = self.cursor.saturating_sub(1),
            Grouping::Compose => {
                if let Some(row) = tree::prev_container_row(&self.tree, self.cursor) {
                    self.cursor = row;
                }
            }
        }
    }

    fn move_down(&mut self) {
        match self.grouping {
            Grouping::Flat => {
                self.cursor = clamp_cursor(self.cursor + 1, self.containers.len());
            }
            Grouping::Compose => {
                if let Some(row) = tree::next_container_row(&self.tree, self.cursor) {
                    self.cursor = row;
                }
            }
        }
    }

    fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.goto_page(self.page + 1, true);
        }
    }

    fn prev_page(&mut self) {
        if self.page > 0 {
            self.goto_page(self.page - 1, false);
        }
    }

    /// Move to a page, putting the cursor on its first selectable row.
    ///
    /// In the tree, a page holding only headers sends the cursor on to the
    /// nearest container row in the paging direction, then the other way.
    fn goto_page(&mut self, page: usize, forward: bool) {
        let start = page * self.page_size;
        let end = start + self.page_size;
        self.page = page;
        self.cursor = match self.grouping {
            Grouping::Flat => start,
            Grouping::Compose => {
                let rows = &self.tree;
                let ahead = || tree::next_container_row(rows, start);
                let behind = || tree::prev_container_row(rows, start);
                rows[start.min(rows.len())..end.min(rows.len())]
                    .iter()
                    .position(|r| !r.is_header())
                    .map(|offset| start + offset)
                    .or_else(|| {
                        if forward {
                            ahead().or_else(behind)
                        } else {
                            behind().or_else(ahead)
                        }
                    })
                    .unwrap_or(start)
            }
        };
    }

    // ==================== derived state ====================

    fn notify(&mut self, text: impl Into<String>) {
        self.status = Some(StatusNotice {
            text: text.into(),
            ticks_left: NOTICE_TICKS,
        });
    }

    fn rebuild_tree(&mut self) {
        self.tree = build_tree(&self.projects, &self.containers, &self.expansion);
    }

    pub fn panel_height(&self) -> u16 {
        match self.mode {
            Mode::Logs => LOGS_PANEL_HEIGHT,
            Mode::Info => INFO_PANEL_HEIGHT,
            _ => 0,
        }
    }

    /// Recompute widths, page size, cursor and page together
    fn recompute_layout(&mut self) {
        self.column_widths =
            allocate_columns(usable_width(self.width), &self.settings.layout.percents());
        self.page_size = layout::page_size(self.height, self.panel_height());
        self.cursor = clamp_cursor(self.cursor, self.row_count());
        self.page = page_of(self.cursor, self.page_size);
    }

    /// Counts for the header meters: (running, stopped)
    pub fn state_counts(&self) -> (usize, usize) {
        let running = self.containers.iter().filter(|c| c.is_running()).count();
        (running, self.containers.len() - running)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
