//! # Plugwork Core Kernel
//!
//! The lifecycle side of the engine.
//!
//! - **[`api`]**: [`Api`], which runs `bootstrap`, `load_plugins` and
//!   `finalize` at most once each, and the [`FinalizedApi`] it produces.
//! - **[`application`]**: the [`Application`] trait a concrete program implements.
//! - **[`logging`]**: mapping the environment to a log level.
//! - **[`constants`]**: names and defaults.
//! - **[`error`]**: the crate-wide [`Error`] and [`Result`].
pub mod api;
pub mod application;
pub mod constants;
pub mod error;
pub mod logging;

pub use api::{Api, FinalizedApi};
pub use application::Application;
pub use error::{Error, Result};
