//! Interactive exec sessions
//!
//! The TUI hands the terminal to `<runtime> exec -it <id> <shell>` and takes
//! it back once the process exits.

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dockhand_config::DEFAULT_SHELL;
use dockhand_runtime::RuntimeClient;
use ratatui::prelude::*;
use std::io::{self, Stdout, Write};
use std::process::{Command, Stdio};

/// Reset terminal to sane state using stty
#[cfg(unix)]
pub fn reset_terminal() {
    let _ = Command::new("stty")
        .arg("sane")
        .stdin(Stdio::inherit())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let _ = io::stdout().flush();
}

#[cfg(not(unix))]
pub fn reset_terminal() {
    let _ = io::stdout().flush();
}

/// Exit codes meaning the shell binary is missing or not executable
pub fn needs_fallback(code: Option<i32>, shell: &str) -> bool {
    matches!(code, Some(126) | Some(127)) && shell != DEFAULT_SHELL
}

/// Run a shell in a container until it exits, then restore the TUI
pub fn run_shell_session(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: &dyn RuntimeClient,
    id: &str,
    shell: &str,
) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let result = exec_with_fallback(client, id, shell);

    reset_terminal();
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.hide_cursor()?;
    terminal.clear()?;

    result
}

fn exec_with_fallback(client: &dyn RuntimeClient, id: &str, shell: &str) -> io::Result<()> {
    tracing::info!("Opening {} in {}", shell, id);
    let status = client.shell_command(id, shell).status()?;
    if status.success() {
        return Ok(());
    }

    if needs_fallback(status.code(), shell) {
        tracing::info!("{} unavailable in {}, retrying with {}", shell, id, DEFAULT_SHELL);
        let status = client.shell_command(id, DEFAULT_SHELL).status()?;
        return exit_result(status);
    }
    exit_result(status)
}

fn exit_result(status: std::process::ExitStatus) -> io::Result<()> {
    // a shell exiting non-zero after a normal session is not an error
    match status.code() {
        Some(126) | Some(127) => Err(io::Error::other(format!(
            "shell could not be started (exit {})",
            status.code().unwrap_or_default()
        ))),
        _ => Ok(()),
    }
}
