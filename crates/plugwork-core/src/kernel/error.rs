//! # Plugwork Core Kernel Errors
//!
//! Defines the crate-wide [`Error`], which wraps the typed error of each
//! subsystem, and the matching [`Result`] alias.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::plugin_system::error::PluginSystemError;
use crate::stage_manager::error::StageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Registration, override, finalization or module loading error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Lifecycle stage error
    #[error("Stage system error: {0}")]
    StageSystem(#[from] StageSystemError),

    /// Environment or config file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message, typically raised by plugin finalize hooks
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
