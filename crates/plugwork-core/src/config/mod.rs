//! # Plugwork Core Configuration
//!
//! The environment object ([`Env`]) that the lifecycle reads its operational
//! flags from, together with the key/value data model and file formats it is
//! loaded from.
//!
//! - **[`env`]**: [`Env`] and the run [`Mode`].
//! - **[`format`]**: [`ConfigData`] and [`ConfigFormat`] (JSON, YAML, TOML).
//! - **[`error`]**: [`ConfigError`].
pub mod env;
pub mod error;
pub mod format;

pub use env::{Env, Mode};
pub use error::ConfigError;
pub use format::{ConfigData, ConfigFormat};
