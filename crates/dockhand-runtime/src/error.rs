//! Error types for the container runtime client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("{binary} not found in PATH")]
    NotFound { binary: String },

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
