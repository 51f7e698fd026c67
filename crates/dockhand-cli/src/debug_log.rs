//! Debug logging that never touches the terminal
//!
//! The TUI owns stdout and stderr, so log output either goes to a file or
//! nowhere at all.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::subscriber::{DefaultGuard, NoSubscriber};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Environment variable naming a log file when `--log-file` is absent
pub const LOG_ENV: &str = "DOCKHAND_LOG";

/// Scoped logging context; logging stops when this is dropped
pub struct DebugLog {
    _guard: DefaultGuard,
}

impl DebugLog {
    /// Install a file logger when `path` is given, otherwise a no-op subscriber
    pub fn open(path: Option<&Path>, verbose: bool) -> Result<Self> {
        let guard = match path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Could not open log file {}", path.display()))?;

                let subscriber = tracing_subscriber::registry()
                    .with(default_filter(verbose))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(Mutex::new(file))
                            .with_ansi(false)
                            .with_target(false),
                    );
                tracing::subscriber::set_default(subscriber)
            }
            None => tracing::subscriber::set_default(NoSubscriber::default()),
        };
        Ok(Self { _guard: guard })
    }
}

/// `RUST_LOG` wins; otherwise debug for our crates with `--verbose`, info without
fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,dockhand=debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_log_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockhand.log");

        {
            let _log = DebugLog::open(Some(&path), false).unwrap();
            tracing::warn!("hello from the test");
        }
        tracing::warn!("after close");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello from the test"));
        assert!(!content.contains("after close"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("dockhand.log");
        assert!(DebugLog::open(Some(&path), true).is_err());
    }

    #[test]
    fn test_no_path_is_silent() {
        let _log = DebugLog::open(None, true).unwrap();
        tracing::warn!("goes nowhere");
    }
}
