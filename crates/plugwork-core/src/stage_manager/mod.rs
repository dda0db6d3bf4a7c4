//! # Plugwork Core Stage Manager
//!
//! Tracks the three lifecycle stages an API object goes through:
//! `bootstrap`, `load_plugins` and `finalize`. Each stage runs at most once
//! per API object, and requesting a later stage implicitly runs the earlier
//! ones first.
//!
//! - **[`tracker`]**: the [`StageTracker`] done-set.
//! - **[`error`]**: [`StageSystemError`](error::StageSystemError).
pub mod error;
pub mod tracker;

use std::fmt;
use std::str::FromStr;

/// A lifecycle stage of an API object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Environment construction
    Bootstrap,
    /// Plugin module import and registration
    LoadPlugins,
    /// Instantiation, namespace construction and eager finalization
    Finalize,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Bootstrap, Stage::LoadPlugins, Stage::Finalize];

    /// The method-style name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bootstrap => "bootstrap",
            Stage::LoadPlugins => "load_plugins",
            Stage::Finalize => "finalize",
        }
    }

    /// The stage that must have run before this one
    pub fn predecessor(&self) -> Option<Stage> {
        match self {
            Stage::Bootstrap => None,
            Stage::LoadPlugins => Some(Stage::Bootstrap),
            Stage::Finalize => Some(Stage::LoadPlugins),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = error::StageSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| error::StageSystemError::UnknownStage { name: s.to_string() })
    }
}

pub use tracker::StageTracker;

// Test module declaration
#[cfg(test)]
mod tests;
