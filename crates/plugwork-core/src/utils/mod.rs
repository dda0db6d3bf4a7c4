//! # Plugwork Core Utilities
//!
//! - **[`fs`]**: plugin module discovery on the filesystem.
pub mod fs;
