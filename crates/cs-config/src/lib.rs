//! Corona site configuration loading and validation.
//!
//! This crate provides:
//! - The typed [`SiteConfig`] read from `site.json`
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod resolve;
pub mod site;
pub mod validate;

pub use resolve::{load_config, resolve_config_path, ConfigSource, LoadedConfig};
pub use site::{ChartScript, ChartSource, SiteConfig, SiteOverrides};
pub use validate::{validate_config, ConfigError, ConfigResult};
