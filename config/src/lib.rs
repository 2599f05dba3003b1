//! Reporter configuration for sleuth.
//!
//! Configuration is read from `<config_dir>/sleuth/config.toml` (or the file
//! named by `SLEUTH_CONFIG`), then individual fields are overridden from the
//! environment:
//!
//! ```toml
//! [diagnostics]
//! trace = "filtered"   # off | filtered | full
//! capture = "always"   # always | env | never
//! hide_frames = ["^my_app::support::"]
//! ```
//!
//! | variable         | field                  |
//! |------------------|------------------------|
//! | `SLEUTH_CONFIG`  | path of the config file |
//! | `SLEUTH_TRACE`   | `diagnostics.trace`    |
//! | `SLEUTH_CAPTURE` | `diagnostics.capture`  |

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub use sleuth_types::CaptureMode;

pub const CONFIG_PATH_ENV: &str = "SLEUTH_CONFIG";
pub const TRACE_ENV: &str = "SLEUTH_TRACE";
pub const CAPTURE_ENV: &str = "SLEUTH_CAPTURE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid hide_frames pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            ConfigError::InvalidPattern { .. } => None,
        }
    }
}

/// How much of a stack trace a diagnostic prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// Header, message and locator only.
    Off,
    /// Frames belonging to sleuth and the unwinding machinery are dropped.
    #[default]
    Filtered,
    Full,
}

impl TraceMode {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "filtered" => Some(Self::Filtered),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub trace: TraceMode,
    #[serde(default)]
    pub capture: CaptureMode,
    /// Extra regular expressions; frames whose symbol matches are hidden.
    #[serde(default)]
    pub hide_frames: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReporterConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl ReporterConfig {
    /// Default config file location, honoring `SLEUTH_CONFIG`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("sleuth").join("config.toml"))
    }

    /// Loads the config file and environment overrides.
    ///
    /// Never fails: a missing file means defaults, and an unreadable or
    /// invalid file is logged and replaced by defaults.
    #[must_use]
    pub fn load() -> Self {
        let mut config = match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "Ignoring sleuth config: {e}");
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok());
        config
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SLEUTH_TRACE` / `SLEUTH_CAPTURE` style overrides from `lookup`.
    /// Unrecognized values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(TRACE_ENV) {
            match TraceMode::parse(&value) {
                Some(mode) => self.diagnostics.trace = mode,
                None => tracing::warn!(var = TRACE_ENV, value = %value, "Unknown trace mode"),
            }
        }
        if let Some(value) = lookup(CAPTURE_ENV) {
            match CaptureMode::parse(&value) {
                Some(mode) => self.diagnostics.capture = mode,
                None => tracing::warn!(var = CAPTURE_ENV, value = %value, "Unknown capture mode"),
            }
        }
    }

    /// Checks that every `hide_frames` entry is a valid regex.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.diagnostics.hide_frames {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn with_trace(mut self, trace: TraceMode) -> Self {
        self.diagnostics.trace = trace;
        self
    }

    #[must_use]
    pub fn with_capture(mut self, capture: CaptureMode) -> Self {
        self.diagnostics.capture = capture;
        self
    }

    #[must_use]
    pub fn with_hidden_frame(mut self, pattern: impl Into<String>) -> Self {
        self.diagnostics.hide_frames.push(pattern.into());
        self
    }
}
