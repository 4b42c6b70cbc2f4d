//! Site configuration (`site.json`).
//!
//! Every field has a default, so an empty object `{}` is a valid file.
//!
//! ```json
//! {
//!   "template_path": "templates/main.tpl",
//!   "assets_dir": "assets",
//!   "chart_script": "plotly-1.58.3.min.js",
//!   "chart_source": "local",
//!   "cumulative_policy": "add_if_missing",
//!   "unknown_placeholders": "ignore",
//!   "group_pages": true,
//!   "minify": false,
//!   "site_title": "Corona worldwide"
//! }
//! ```

use crate::validate::{ConfigError, ConfigResult};
use cs_store::CumulativePolicy;
use cs_template::UnknownPlaceholderPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Chart library file referenced by every chart page.
pub const DEFAULT_CHART_SCRIPT: &str = "plotly-1.58.3.min.js";

/// Where the chart library is loaded from with [`ChartSource::Cdn`].
pub const DEFAULT_CHART_CDN_BASE: &str = "https://cdn.plot.ly";

pub const DEFAULT_SITE_TITLE: &str = "Corona worldwide";

/// Configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Template document; the built-in one is used when unset.
    pub template_path: Option<PathBuf>,

    /// Directory whose regular files are copied to `<output>/assets`.
    /// The generator falls back to its built-in assets directory.
    pub assets_dir: Option<PathBuf>,

    /// File name of the chart library.
    pub chart_script: String,

    pub chart_source: ChartSource,

    /// CDN base URL for [`ChartSource::Cdn`].
    pub chart_cdn_base: String,

    pub cumulative_policy: CumulativePolicy,

    pub unknown_placeholders: UnknownPlaceholderPolicy,

    /// Generate one incidence page per group.
    pub group_pages: bool,

    /// Minify full pages.
    pub minify: bool,

    /// Title of the index page.
    pub site_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            assets_dir: None,
            chart_script: DEFAULT_CHART_SCRIPT.to_string(),
            chart_source: ChartSource::default(),
            chart_cdn_base: DEFAULT_CHART_CDN_BASE.to_string(),
            cumulative_policy: CumulativePolicy::default(),
            unknown_placeholders: UnknownPlaceholderPolicy::default(),
            group_pages: true,
            minify: false,
            site_title: DEFAULT_SITE_TITLE.to_string(),
        }
    }
}

/// Where pages load the chart library from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSource {
    /// Copied into `<output>/assets`; the run fails if the file is missing.
    #[default]
    Local,
    /// Referenced on `chart_cdn_base`; nothing is copied for it.
    Cdn,
}

/// How pages reference the chart library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartScript {
    /// Shipped in the `assets` directory of the output.
    Local(String),
    /// Loaded from a CDN.
    Remote(String),
}

impl ChartScript {
    /// Value for the `src` attribute of the script tag.
    pub fn src(&self) -> &str {
        match self {
            ChartScript::Local(path) | ChartScript::Remote(path) => path,
        }
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct SiteOverrides {
    pub template_path: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub recompute_totals: bool,
    pub no_group_pages: bool,
    pub minify: bool,
    pub chart_cdn: bool,
}

impl SiteConfig {
    /// Read a configuration file.
    ///
    /// Relative paths inside the file are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::parse_json(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.with_base_dir(base))
    }

    /// Parse a configuration from JSON text.
    pub fn parse_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    fn with_base_dir(mut self, base: &Path) -> Self {
        let rebase = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.template_path = self.template_path.map(rebase);
        self.assets_dir = self.assets_dir.map(rebase);
        self
    }

    /// Apply command line values on top of this configuration.
    pub fn apply_overrides(&mut self, overrides: &SiteOverrides) {
        if let Some(path) = &overrides.template_path {
            self.template_path = Some(path.clone());
        }
        if let Some(dir) = &overrides.assets_dir {
            self.assets_dir = Some(dir.clone());
        }
        if overrides.recompute_totals {
            self.cumulative_policy = CumulativePolicy::Recompute;
        }
        if overrides.no_group_pages {
            self.group_pages = false;
        }
        if overrides.minify {
            self.minify = true;
        }
        if overrides.chart_cdn {
            self.chart_source = ChartSource::Cdn;
        }
    }

    /// Chart library reference for generated pages.
    pub fn chart_script(&self) -> ChartScript {
        match self.chart_source {
            ChartSource::Local => ChartScript::Local(format!("./assets/{}", self.chart_script)),
            ChartSource::Cdn => ChartScript::Remote(format!(
                "{}/{}",
                self.chart_cdn_base.trim_end_matches('/'),
                self.chart_script
            )),
        }
    }
}
