//! Background execution of commands
//!
//! Every command except `OpenShell` runs on its own tokio task and posts
//! exactly one completion message back into the event queue.

use crate::message::{Command, Message};
use dockhand_config::{ConfigError, Settings};
use dockhand_runtime::{refresh_compose_projects, refresh_containers, RuntimeClient, LOG_TAIL_LINES};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Runs commands against the runtime client off the update loop
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn RuntimeClient>,
    tx: UnboundedSender<Message>,
    /// Where `SaveSettings` writes; the user config path when unset
    settings_path: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn RuntimeClient>, tx: UnboundedSender<Message>) -> Self {
        Self {
            client,
            tx,
            settings_path: None,
        }
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn client(&self) -> &dyn RuntimeClient {
        self.client.as_ref()
    }

    /// Start a command in the background.
    ///
    /// Returns the command back when it must run in the foreground instead.
    pub fn dispatch(&self, command: Command) -> Option<Command> {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        match command {
            Command::OpenShell { .. } => return Some(command),
            Command::FetchContainers => {
                tokio::spawn(async move {
                    let result = refresh_containers(client.as_ref()).await;
                    let _ = tx.send(Message::ContainersLoaded(result));
                });
            }
            Command::FetchComposeProjects => {
                tokio::spawn(async move {
                    let result = refresh_compose_projects(client.as_ref()).await;
                    let _ = tx.send(Message::ComposeProjectsLoaded(result));
                });
            }
            Command::FetchLogs(id) => {
                tokio::spawn(async move {
                    let result = client.fetch_logs(&id, LOG_TAIL_LINES).await;
                    let _ = tx.send(Message::LogsLoaded { id, result });
                });
            }
            Command::PerformAction(verb, id) => {
                tokio::spawn(async move {
                    tracing::info!("{} container {}", verb.progress_label(), id);
                    let result = client.perform_action(verb, &id).await;
                    let _ = tx.send(Message::ActionDone { verb, id, result });
                });
            }
            Command::Tick {
                interval,
                generation,
            } => {
                tokio::spawn(async move {
                    tokio::time::sleep(interval).await;
                    let _ = tx.send(Message::Tick(generation));
                });
            }
            Command::SaveSettings(settings) => {
                let path = self.settings_path.clone();
                let log = tracing::dispatcher::get_default(|d| d.clone());
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        tracing::dispatcher::with_default(&log, || save(&settings, path))
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(ConfigError::WriteError {
                            path: PathBuf::new(),
                            source: std::io::Error::other(e.to_string()),
                        })
                    });
                    let _ = tx.send(Message::SettingsSaved(result));
                });
            }
        }
        None
    }
}

fn save(settings: &Settings, path: Option<PathBuf>) -> dockhand_config::Result<()> {
    match path {
        Some(path) => settings.save_to(&path),
        None => settings.save(),
    }
}
