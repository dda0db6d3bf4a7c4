use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::config::error::ConfigError;
use crate::config::format::ConfigData;
use crate::kernel::constants;

pub const MODE: &str = "mode";
pub const CONTEXT: &str = "context";
pub const CONF: &str = "conf";
pub const DEBUG: &str = "debug";
pub const VERBOSE: &str = "verbose";
pub const PLUGINS_ON_DEMAND: &str = "plugins_on_demand";
pub const STARTUP_TRACEBACK: &str = "startup_traceback";
pub const FAIL_ON_SKIP: &str = "fail_on_skip";

const BOOL_KEYS: [&str; 4] = [DEBUG, PLUGINS_ON_DEMAND, STARTUP_TRACEBACK, FAIL_ON_SKIP];

/// Run mode of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Production,
    Developer,
    /// Declared test mode: plugin loading and locking are skipped
    UnitTest,
    /// Declared test mode: plugin loading and locking are skipped
    Dummy,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Developer => "developer",
            Mode::UnitTest => "unit_test",
            Mode::Dummy => "dummy",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }

    /// Whether this is one of the declared non-production test modes
    pub fn is_test(&self) -> bool {
        matches!(self, Mode::UnitTest | Mode::Dummy)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Mode::Production),
            "developer" => Ok(Mode::Developer),
            "unit_test" => Ok(Mode::UnitTest),
            "dummy" => Ok(Mode::Dummy),
            other => Err(ConfigError::InvalidValue {
                key: MODE.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Operational environment of an API object.
///
/// Built once during the bootstrap stage from explicit overrides, an optional
/// configuration file named by the `conf` key, and built-in defaults, in that
/// order of precedence. Read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Env {
    values: ConfigData,
}

impl Env {
    /// An empty environment. Every typed accessor falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the environment from overrides, the `conf` file and defaults.
    pub fn bootstrap(overrides: ConfigData) -> Result<Self, ConfigError> {
        let mut values = overrides;

        if let Some(conf) = values.get::<String>(CONF) {
            let path = PathBuf::from(conf);
            let from_file = ConfigData::load(&path)?;
            log::debug!("Loaded {} configuration keys from {}", from_file.len(), path.display());
            values.merge_missing(&from_file);
        }

        values.merge_missing(&Self::defaults(&values));
        Self::validate(&values)?;
        Ok(Self { values })
    }

    /// Bootstrap from `KEY=VAL` strings
    pub fn from_overrides<I, S>(items: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::bootstrap(Self::parse_overrides(items)?)
    }

    /// Parse `KEY=VAL` strings into config data. Later keys win.
    pub fn parse_overrides<I, S>(items: I) -> Result<ConfigData, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut data = ConfigData::new();
        for item in items {
            let (key, value) = Self::parse_override(item.as_ref())?;
            data.set_raw(&key, value);
        }
        Ok(data)
    }

    /// Parse one `KEY=VAL` string, coercing the value.
    ///
    /// `true`/`false` (any case) become booleans, integers become numbers,
    /// anything else stays a string.
    pub fn parse_override(item: &str) -> Result<(String, Value), ConfigError> {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidOverride(item.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidOverride(item.to_string()));
        }
        Ok((key.to_string(), Self::coerce(value.trim())))
    }

    fn coerce(value: &str) -> Value {
        match value.to_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(number) = value.parse::<i64>() {
            return Value::from(number);
        }
        Value::String(value.to_string())
    }

    fn defaults(current: &ConfigData) -> ConfigData {
        let context = current.get_or(CONTEXT, constants::DEFAULT_CONTEXT.to_string());
        let mut defaults = ConfigData::new();
        defaults.set_raw(MODE, Value::from(constants::DEFAULT_MODE));
        defaults.set_raw(CONTEXT, Value::from(context.clone()));
        defaults.set_raw(DEBUG, Value::Bool(false));
        defaults.set_raw(VERBOSE, Value::from(0));
        defaults.set_raw(STARTUP_TRACEBACK, Value::Bool(false));
        defaults.set_raw(FAIL_ON_SKIP, Value::Bool(false));
        // Interactive contexts only pay for the plugins they touch.
        defaults.set_raw(PLUGINS_ON_DEMAND, Value::Bool(context == constants::CLI_CONTEXT));
        defaults
    }

    fn validate(values: &ConfigData) -> Result<(), ConfigError> {
        if let Some(raw) = values.get_raw(MODE) {
            let mode = raw.as_str().ok_or_else(|| ConfigError::InvalidValue {
                key: MODE.to_string(),
                value: raw.to_string(),
            })?;
            Mode::from_str(mode)?;
        }
        for key in BOOL_KEYS {
            if let Some(raw) = values.get_raw(key) {
                if !raw.is_boolean() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: raw.to_string(),
                    });
                }
            }
        }
        if let Some(raw) = values.get_raw(VERBOSE) {
            if raw.as_u64().is_none() {
                return Err(ConfigError::InvalidValue {
                    key: VERBOSE.to_string(),
                    value: raw.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The run mode, `production` unless configured otherwise
    pub fn mode(&self) -> Mode {
        self.values
            .get::<String>(MODE)
            .and_then(|mode| Mode::from_str(&mode).ok())
            .unwrap_or(Mode::Production)
    }

    pub fn is_production_mode(&self) -> bool {
        self.mode().is_production()
    }

    /// Whether plugin finalization is deferred until first use
    pub fn plugins_on_demand(&self) -> bool {
        self.values.get_or(PLUGINS_ON_DEMAND, false)
    }

    /// Whether module import failures are logged with their full error chain
    pub fn startup_traceback(&self) -> bool {
        self.values.get_or(STARTUP_TRACEBACK, false)
    }

    /// Whether a module asking to be skipped aborts the whole load
    pub fn fail_on_skip(&self) -> bool {
        self.values.get_or(FAIL_ON_SKIP, false)
    }

    pub fn debug(&self) -> bool {
        self.values.get_or(DEBUG, false)
    }

    pub fn verbose(&self) -> u64 {
        self.values.get_or(VERBOSE, 0)
    }

    pub fn context(&self) -> String {
        self.values
            .get_or(CONTEXT, constants::DEFAULT_CONTEXT.to_string())
    }

    pub fn conf(&self) -> Option<PathBuf> {
        self.values.get::<String>(CONF).map(PathBuf::from)
    }

    /// Get an arbitrary value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.values.keys()
    }

    /// The underlying key/value data
    pub fn data(&self) -> &ConfigData {
        &self.values
    }
}
