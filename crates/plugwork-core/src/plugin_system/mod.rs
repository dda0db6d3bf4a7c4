//! # Plugwork Core Plugin System
//!
//! Declaration, override resolution and finalization of plugins.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`class`]**: [`PluginClass`], the declared type of a plugin with its
//!   bases and factory.
//! - **[`registry`]**: [`Registry`], the insertion-ordered ledger of
//!   declarations a plugin module hands to the API.
//! - **[`resolver`]**: [`OverrideResolver`], which keeps one active class per
//!   plugin name and links every override to the class it replaced.
//! - **[`instance`]**: [`PluginInstance`] and its at-most-once finalization
//!   state machine, plus lazily finalized attributes ([`FinalizeAttr`]).
//! - **[`namespace`]**: [`Namespace`], the per-base view over the instances.
//! - **[`loader`]**: plugin packages and module import.
//! - **[`traits`]**: the [`Plugin`] trait and [`Base`].
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod class;
pub mod error;
pub mod instance;
pub mod loader;
pub mod namespace;
pub mod registry;
pub mod resolver;
pub mod traits;

pub use class::{ClassId, PluginClass, PluginClassBuilder};
pub use instance::{FinalizeAttr, FinalizeContext, FinalizeState, PluginInstance};
pub use loader::{DirectoryPackage, ImportError, PluginModule, PluginPackage, StaticPackage};
pub use namespace::{Namespace, PluginInfo};
pub use registry::{Metadata, PluginDeclaration, Registry};
pub use resolver::OverrideResolver;
pub use traits::{Base, Plugin};
