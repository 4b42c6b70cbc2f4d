//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → defaults.

use crate::site::SiteConfig;
use crate::validate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via `--config`.
    CliArgument,

    /// Set via `CS_CONFIG` or `CS_CONFIG_DIR`.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// No file; built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "CS_CONFIG";
pub const ENV_CONFIG_DIR: &str = "CS_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "site.json";

/// Application name for XDG directories.
const APP_NAME: &str = "corona-site";

/// A configuration together with its origin.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SiteConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Find the configuration file to use.
///
/// 1. Explicit CLI path (must exist)
/// 2. `CS_CONFIG` (must exist)
/// 3. `CS_CONFIG_DIR` + `site.json` (if present)
/// 4. `~/.config/corona-site/site.json` (if present)
/// 5. Built-in defaults (`None`)
pub fn resolve_config_path(cli_path: Option<&Path>) -> ConfigResult<(Option<PathBuf>, ConfigSource)> {
    resolve_with(
        cli_path,
        |key| std::env::var(key).ok(),
        xdg_config_dir(),
    )
}

fn resolve_with<E>(
    cli_path: Option<&Path>,
    env: E,
    xdg_dir: Option<PathBuf>,
) -> ConfigResult<(Option<PathBuf>, ConfigSource)>
where
    E: Fn(&str) -> Option<String>,
{
    // 1. CLI argument
    if let Some(path) = cli_path {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
                origin: "--config".to_string(),
            });
        }
        return Ok((Some(path.to_path_buf()), ConfigSource::CliArgument));
    }

    // 2. Environment variable (direct path)
    if let Some(value) = env(ENV_CONFIG_PATH).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(value);
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path,
                origin: ENV_CONFIG_PATH.to_string(),
            });
        }
        return Ok((Some(path), ConfigSource::Environment));
    }

    // 3. Environment variable (config dir)
    if let Some(dir) = env(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(dir).join(CONFIG_FILENAME);
        if path.is_file() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_dir {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    // 5. Built-in default
    Ok((None, ConfigSource::BuiltinDefault))
}

/// Resolve and read the configuration. Does not validate.
pub fn load_config(cli_path: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let (path, source) = resolve_config_path(cli_path)?;
    let config = match &path {
        Some(p) => SiteConfig::from_file(p)?,
        None => SiteConfig::default(),
    };
    debug!(source = %source, path = ?path, "Resolved site configuration");
    Ok(LoadedConfig {
        config,
        path,
        source,
    })
}

/// XDG config directory for corona-site.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
