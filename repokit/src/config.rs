//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `REPOKIT_`, sections separated by `__`)
//! 2. Current working directory: ./repokit.toml
//! 3. XDG config directory: ~/.config/repokit/config.toml
//! 4. System directory: /etc/repokit/config.toml
//! 5. Default values
//!
//! ```toml
//! [logging]
//! level = "repokit=debug,info"
//! json = false
//!
//! [query]
//! default_page_size = 50
//! max_page_size = 500
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

const APP_NAME: &str = "repokit";
const ENV_PREFIX: &str = "REPOKIT_";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Paging defaults applied by repository implementations
    #[serde(default)]
    pub query: QueryDefaults,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives (trace, debug, info, warn, error, or per-target)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default = "default_false")]
    pub json: bool,
}

/// Paging defaults
///
/// Used by [`PageRule::normalized`](crate::query::PageRule::normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    /// Page size used when a caller supplies none
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Upper bound on any page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_false(),
        }
    }
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

fn default_page_size() -> i64 {
    20
}

fn default_max_page_size() -> i64 {
    100
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (highest priority first):
    /// 1. Current working directory: ./repokit.toml
    /// 2. XDG config directory: ~/.config/repokit/config.toml
    /// 3. System directory: /etc/repokit/config.toml
    ///
    /// Environment variables (`REPOKIT_` prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(figment)
    }

    /// Extract and validate a configuration from any figment
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.query.validate()?;
        Ok(config)
    }

    /// Find all possible config file paths, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(format!("{APP_NAME}.toml"))];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(Path::new("/etc").join(APP_NAME).join("config.toml"));
        paths
    }
}

impl QueryDefaults {
    fn validate(&self) -> std::result::Result<(), figment::Error> {
        if self.default_page_size <= 0 {
            return Err(figment::Error::from(format!(
                "query.default_page_size must be positive, got {}",
                self.default_page_size
            )));
        }
        if self.max_page_size < self.default_page_size {
            return Err(figment::Error::from(format!(
                "query.max_page_size ({}) is below query.default_page_size ({})",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }
}
