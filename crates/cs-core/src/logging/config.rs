//! Where the log level and format come from.
//!
//! Precedence, highest first: `-q`/`-v` and `--log-format`, then `CS_LOG` and
//! `CS_LOG_FORMAT`, then `RUST_LOG` directives, then `info` in human format.

use std::str::FromStr;

/// Output format of log events on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "jsonl" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}', expected human or jsonl", other)),
        }
    }
}

/// Most verbose level shown for the generator's own crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Resolved logging setup for one run.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw `RUST_LOG` directives. Only set when neither the command line nor
    /// `CS_LOG` chose a level.
    pub directives: Option<String>,
}

impl LogConfig {
    /// Resolve from the process environment and the command line.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    fn from_lookup<E>(env: E, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let env_level = env("CS_LOG").and_then(|val| val.parse::<LogLevel>().ok());
        let directives = match cli_level.or(env_level) {
            Some(_) => None,
            None => env("RUST_LOG").filter(|val| !val.trim().is_empty()),
        };
        let env_format = env("CS_LOG_FORMAT").and_then(|val| val.parse::<LogFormat>().ok());

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
            directives,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self.directives = None;
        self
    }
}
