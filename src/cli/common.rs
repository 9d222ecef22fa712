//! Common helper functions shared across CLI commands

use crate::cli::init::CONFIG_FILE;
use crate::config::Config;
use crate::error::ConfigError;
use std::path::Path;

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
/// At least one error-severity diagnostic (or rewrite error) was produced
pub const EXIT_VIOLATIONS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
/// Configuration or translation unit dump failed to parse
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Load configuration
///
/// An explicit path must exist. Without one, `./gcsafe.toml` is used when
/// present and the built-in defaults otherwise.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::load(path),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.is_file() {
                Config::load(default_path)
            } else {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                Ok(Config::default())
            }
        }
    }
}

/// Exit code for a configuration failure
pub(crate) fn config_exit_code(error: &ConfigError) -> i32 {
    match error {
        ConfigError::Parse(_) => EXIT_PARSE_ERROR,
        ConfigError::Io(_) | ConfigError::Validation(_) => EXIT_ERROR,
    }
}
