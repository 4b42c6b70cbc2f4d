//! Configuration errors and semantic validation.

use crate::site::SiteConfig;
use cs_common::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("config file {path} given by {origin} does not exist")]
    NotFound { path: PathBuf, origin: String },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration for values the generator cannot work with.
///
/// Path checks run against the file system as it is now.
pub fn validate_config(config: &SiteConfig) -> ConfigResult<()> {
    if config.site_title.trim().is_empty() {
        return Err(ConfigError::invalid("site_title", "must not be empty"));
    }

    let script = config.chart_script.as_str();
    if script.is_empty() {
        return Err(ConfigError::invalid("chart_script", "must not be empty"));
    }
    if script.contains(['/', '\\']) || script == "." || script == ".." {
        return Err(ConfigError::invalid(
            "chart_script",
            format!("'{}' must be a plain file name", script),
        ));
    }

    let base = config.chart_cdn_base.as_str();
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(ConfigError::invalid(
            "chart_cdn_base",
            format!("'{}' is not an http(s) URL", base),
        ));
    }

    if let Some(path) = &config.template_path {
        if !path.is_file() {
            return Err(ConfigError::invalid(
                "template_path",
                format!("{} is not a file", path.display()),
            ));
        }
    }

    if let Some(dir) = &config.assets_dir {
        if !dir.is_dir() {
            return Err(ConfigError::invalid(
                "assets_dir",
                format!("{} is not a directory", dir.display()),
            ));
        }
    }

    Ok(())
}
