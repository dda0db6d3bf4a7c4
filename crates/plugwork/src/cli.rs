use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use plugwork_core::kernel::constants::CLI_CONTEXT;

/// Plugwork: drive a plugin API through bootstrap, load and finalize
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Print "pong" and exit without bootstrapping
    #[arg(long)]
    pub ping: bool,

    /// Set an environment variable (KEY=VAL), may be repeated
    #[arg(short = 'e', value_name = "KEY=VAL", action = ArgAction::Append, global = true)]
    pub env_vars: Vec<String>,

    /// Load configuration from FILE
    #[arg(short = 'c', long = "conf", value_name = "FILE", global = true)]
    pub conf: Option<PathBuf>,

    /// Produce full debugging output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Produce more verbose output, may be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory of site plugin modules to load
    #[arg(long, value_name = "DIR", global = true)]
    pub plugin_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List namespaces and their plugins
    Namespaces,
    /// List plugins and the namespaces they joined
    Plugins,
    /// Show the bootstrapped environment
    Env,
    /// Run a command plugin
    Run {
        /// Name of the command
        name: String,
    },
}

impl CliArgs {
    /// Environment overrides, later entries winning over earlier ones.
    ///
    /// Explicit `-e` values sit between the command line context and the
    /// dedicated flags.
    pub fn overrides(&self) -> Vec<String> {
        let mut overrides = vec![format!("context={}", CLI_CONTEXT)];
        overrides.extend(self.env_vars.iter().cloned());
        if let Some(conf) = &self.conf {
            overrides.push(format!("conf={}", conf.display()));
        }
        if self.debug {
            overrides.push("debug=true".to_string());
        }
        if self.verbose > 0 {
            overrides.push(format!("verbose={}", self.verbose));
        }
        overrides
    }
}
