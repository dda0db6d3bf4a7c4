use log::LevelFilter;

use crate::config::Env;
use crate::kernel::constants::CLI_CONTEXT;

/// Log level an environment asks for.
///
/// `debug` wins. The command line stays quiet unless made verbose.
pub fn level_for(env: &Env) -> LevelFilter {
    if env.debug() {
        LevelFilter::Debug
    } else if env.context() == CLI_CONTEXT && env.verbose() == 0 {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}
