//! Terminal dashboard for dockhand
//!
//! Built with Ratatui. State lives in [`App`]; background work is run by the
//! [`Dispatcher`] and reported back as [`Message`]s.

pub mod app;
pub mod command;
mod event;
pub mod layout;
pub mod message;
pub mod settings;
pub mod shell;
pub mod sort;
pub mod tree;
pub mod ui;

pub use app::{App, AppError, AppResult, Grouping, Mode};
pub use command::Dispatcher;
pub use event::EventHandler;
pub use message::{Command, Message};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dockhand_config::Settings;
use dockhand_runtime::RuntimeClient;
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run the TUI application until the user quits
pub async fn run(client: Arc<dyn RuntimeClient>, settings: Settings) -> AppResult<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, client, settings).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: Arc<dyn RuntimeClient>,
    settings: Settings,
) -> AppResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let size = terminal.size()?;
    let mut app = App::new(settings, client.kind(), size.width, size.height);
    let theme = ui::Theme::default();
    let dispatcher = Dispatcher::new(client, tx.clone());
    let events = EventHandler::new(tx.clone());

    tracing::info!("TUI started ({}x{})", size.width, size.height);
    for command in app.init() {
        dispatcher.dispatch(command);
    }

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &app, &theme))?;

        let Some(message) = rx.recv().await else {
            return Err(AppError::Terminal("event channel closed".to_string()));
        };

        for command in app.update(message) {
            if let Some(Command::OpenShell { id, shell }) = dispatcher.dispatch(command) {
                events.pause();
                let result = shell::run_shell_session(terminal, dispatcher.client(), &id, &shell);
                events.resume();
                if let Err(e) = &result {
                    tracing::warn!("Shell session in {} failed: {}", id, e);
                }
                let _ = tx.send(Message::ShellExited(result));
            }
        }
    }

    tracing::info!("TUI exiting");
    Ok(())
}
