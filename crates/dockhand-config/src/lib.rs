//! Settings for dockhand
//!
//! Handles the user settings file (`~/.config/dockhand/config.yml`):
//! column layout percentages, refresh interval, runtime backend and exec shell.

mod error;
mod settings;

pub use error::*;
pub use settings::*;
