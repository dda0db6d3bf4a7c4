//! # Plugwork Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], covering registration and override
//! validation, finalization of plugin instances, and plugin module loading.
use std::error::Error as StdError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("plugin '{plugin}' is already registered")]
    DuplicateRegistration { plugin: String },

    #[error("plugin '{plugin}' does not implement any of the bases {bases:?}")]
    Subclass { plugin: String, bases: Vec<String> },

    #[error("{base}.{name} is already registered; use override=true to replace it with {plugin}")]
    Override {
        base: String,
        name: String,
        plugin: String,
    },

    #[error("{base}.{name} is not registered; {plugin} cannot override it")]
    MissingOverride {
        base: String,
        name: String,
        plugin: String,
    },

    #[error("plugin '{plugin}' does not override any other plugin")]
    NotFound { plugin: String },

    #[error("finalized attribute '{attribute}' of {plugin} was never set")]
    UnsetFinalizedAttribute { attribute: String, plugin: String },

    #[error("attribute '{attribute}' of {plugin} is already set")]
    AttributeAlreadySet { attribute: String, plugin: String },

    #[error("{plugin} is locked; cannot set attribute '{attribute}'")]
    PluginLocked { attribute: String, plugin: String },

    #[error("{plugin}.finalize() already called")]
    AlreadyFinalized { plugin: String },

    #[error("finalization of {plugin} failed earlier and is not retried")]
    FinalizationFailed { plugin: String },

    #[error("module '{module}' has no plugin registry")]
    ModuleRegistration { module: String },

    #[error("module '{module}' was skipped: {reason}")]
    ModuleSkipped { module: String, reason: String },

    #[error("failed to import module '{module}': {source}")]
    ModuleImport {
        module: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("the API is locked; cannot {operation} after finalize()")]
    ApiLocked { operation: String },

    #[error("the API has not been finalized")]
    NotFinalized,
}
