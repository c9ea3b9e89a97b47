//! Configuration loading with precedence handling.
//!
//! Precedence (highest to lowest): CLI arguments, `REVDIFF_*` environment
//! variables, the TOML config file, hardcoded defaults.

mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
