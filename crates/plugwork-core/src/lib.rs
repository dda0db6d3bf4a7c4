//! # Plugwork Core
//!
//! A plugin registration, override resolution and lifecycle engine.
//!
//! Plugin modules declare classes in a [`Registry`]. The [`Api`] validates
//! every declaration as it arrives, keeping one active class per plugin name,
//! and on `finalize` instantiates each active class once, groups the
//! instances into one [`Namespace`] per declared [`Base`], and runs the
//! at-most-once finalization of each [`PluginInstance`].
pub mod config;
pub mod kernel;
pub mod plugin_system;
pub mod stage_manager;
pub mod utils;

pub use config::{ConfigData, Env, Mode};
pub use kernel::error::Error as KernelError;
pub use kernel::{Api, Application, FinalizedApi, Result};
pub use plugin_system::{
    Base, FinalizeAttr, FinalizeContext, Namespace, Plugin, PluginClass, PluginInstance, Registry,
};
pub use stage_manager::Stage;

// Crate-level scenario tests
#[cfg(test)]
mod tests;
