//! Configuration file loading and the override chain.

use crate::layout::DEFAULT_CHUNK_SIZE;
use crate::model::{FontContext, ThemeToken};
use crate::paging::DEFAULT_PREFETCH_THRESHOLD;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read a config file that exists.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; missing fields fall back to hardcoded
/// defaults. Corresponds to `~/.config/revdiff/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Rows per concurrent layout chunk.
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// Trailing prefetch margin in lines.
    #[serde(default)]
    pub prefetch_threshold: Option<usize>,

    /// Layout worker threads (0 = one per core).
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Theme name ("light", "dark", "sepia", "black").
    #[serde(default)]
    pub theme: Option<String>,

    /// Font context name ("compact", "regular", "large").
    #[serde(default)]
    pub font: Option<String>,

    /// Path to the log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Rows per concurrent layout chunk.
    pub chunk_size: usize,
    /// Trailing prefetch margin in lines.
    pub prefetch_threshold: usize,
    /// Layout worker threads (0 = one per core).
    pub worker_threads: usize,
    /// Theme token.
    pub theme: ThemeToken,
    /// Font context.
    pub font: FontContext,
    /// Path to the log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            worker_threads: 0,
            theme: ThemeToken::Light,
            font: FontContext::Regular,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve the default log file path.
///
/// `~/.local/state/revdiff/revdiff.log` on Unix-like systems, the
/// platform state directory elsewhere, falling back to the current
/// directory when no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("revdiff").join("revdiff.log")
    } else {
        PathBuf::from("revdiff.log")
    }
}

/// Resolve the default config file path.
///
/// `~/.config/revdiff/config.toml` on Unix, the platform config
/// directory elsewhere. `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("revdiff").join("config.toml"))
}

/// Load a configuration file from a specific path.
///
/// A missing file is not an error (`Ok(None)`): defaults apply.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with path precedence.
///
/// Precedence (highest to lowest): the explicit `config_path` argument
/// (CLI `--config`), the `REVDIFF_CONFIG` environment variable, the
/// default path. Missing files are not errors.
///
/// # Errors
///
/// Returns an error only if a config file exists but cannot be read or
/// parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("REVDIFF_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge an optional config file into the defaults.
///
/// Invalid token names are warned about and fall back to the default
/// rather than failing startup.
pub fn merge_config(file: Option<ConfigFile>) -> ResolvedConfig {
    let mut config = ResolvedConfig::default();
    let Some(file) = file else {
        return config;
    };

    if let Some(chunk_size) = file.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(threshold) = file.prefetch_threshold {
        config.prefetch_threshold = threshold;
    }
    if let Some(workers) = file.worker_threads {
        config.worker_threads = workers;
    }
    if let Some(theme) = file.theme {
        match theme.parse() {
            Ok(theme) => config.theme = theme,
            Err(error) => warn!(%error, "ignoring config theme"),
        }
    }
    if let Some(font) = file.font {
        match font.parse() {
            Ok(font) => config.font = font,
            Err(error) => warn!(%error, "ignoring config font"),
        }
    }
    if let Some(path) = file.log_file_path {
        config.log_file_path = path;
    }
    config
}

/// Apply environment variable overrides.
///
/// Checks `REVDIFF_THEME`, `REVDIFF_FONT`, and `REVDIFF_LOG`.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(theme) = std::env::var("REVDIFF_THEME") {
        match theme.parse() {
            Ok(theme) => config.theme = theme,
            Err(error) => warn!(%error, "ignoring REVDIFF_THEME"),
        }
    }
    if let Ok(font) = std::env::var("REVDIFF_FONT") {
        match font.parse() {
            Ok(font) => config.font = font,
            Err(error) => warn!(%error, "ignoring REVDIFF_FONT"),
        }
    }
    if let Ok(path) = std::env::var("REVDIFF_LOG") {
        config.log_file_path = PathBuf::from(path);
    }
    config
}

/// Apply CLI argument overrides, the highest-precedence layer.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    theme: Option<ThemeToken>,
    font: Option<FontContext>,
    chunk_size: Option<usize>,
) -> ResolvedConfig {
    if let Some(theme) = theme {
        config.theme = theme;
    }
    if let Some(font) = font {
        config.font = font;
    }
    if let Some(chunk_size) = chunk_size {
        config.chunk_size = chunk_size;
    }
    config
}
