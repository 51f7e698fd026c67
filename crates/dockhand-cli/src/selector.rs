//! Interactive runtime selection for `dockhand --runtime`

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Select};
use dockhand_runtime::{detect_available_runtimes, RuntimeKind};
use std::io::IsTerminal;

/// What detection leaves us to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No engine answered
    Nothing,
    /// Exactly one engine answered
    Only(RuntimeKind),
    /// Several answered; the user picks
    Ask(Vec<RuntimeKind>),
}

impl Selection {
    pub fn from_detected(detected: &[(RuntimeKind, bool)]) -> Self {
        let available: Vec<RuntimeKind> = detected
            .iter()
            .filter(|(_, ok)| *ok)
            .map(|(kind, _)| *kind)
            .collect();
        match available.as_slice() {
            [] => Selection::Nothing,
            [only] => Selection::Only(*only),
            _ => Selection::Ask(available),
        }
    }
}

/// Detect engines and settle on one, prompting when there is a choice
pub async fn select_runtime(current: RuntimeKind) -> Result<RuntimeKind> {
    eprintln!("Checking for container runtimes...");
    let detected = detect_available_runtimes().await;

    match Selection::from_detected(&detected) {
        Selection::Nothing => {
            bail!("No container runtime detected. Please install Docker or Podman and try again.")
        }
        Selection::Only(kind) => {
            eprintln!("Auto-selected {} (only available runtime)", kind);
            Ok(kind)
        }
        Selection::Ask(choices) => {
            if !std::io::stdin().is_terminal() {
                eprintln!("Non-interactive mode - keeping {}", current);
                return Ok(current);
            }
            let items: Vec<String> = choices.iter().map(|kind| kind.to_string()).collect();
            let default = choices.iter().position(|k| *k == current).unwrap_or(0);
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select the container runtime to use")
                .items(&items)
                .default(default)
                .interact()?;
            Ok(choices[selection])
        }
    }
}
