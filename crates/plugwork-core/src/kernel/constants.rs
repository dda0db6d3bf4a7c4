/// Application name
pub const APP_NAME: &str = "plugwork";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run mode used when none is configured
pub const DEFAULT_MODE: &str = "production";

/// Context used when none is configured
pub const DEFAULT_CONTEXT: &str = "default";

/// Context of the command line front end
pub const CLI_CONTEXT: &str = "cli";
