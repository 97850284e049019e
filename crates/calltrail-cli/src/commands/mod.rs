//! CLI command implementations

pub mod config;
pub mod log;

use calltrail_logging::LoggerConfig;
use std::path::Path;

/// Configuration from `path`, or the defaults when no file is given
pub(crate) fn load_config(path: Option<&Path>) -> calltrail_logging::Result<LoggerConfig> {
    match path {
        Some(path) => LoggerConfig::load(path),
        None => Ok(LoggerConfig::default()),
    }
}
