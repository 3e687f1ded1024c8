//! Configuration management using Figment
//!
//! Settings are loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: ACTON_PAGING_)
//! 2. Current working directory: ./paging.toml
//! 3. XDG config directory: ~/.config/acton-paging/paging.toml
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::repository::DEFAULT_PAGE_SIZE;

const CONFIG_FILE: &str = "paging.toml";
const ENV_PREFIX: &str = "ACTON_PAGING_";

/// Paging defaults shared by every builder created from these settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSettings {
    /// Page size used when a builder has none set
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound for page sizes; larger requests are clamped
    #[serde(default)]
    pub max_page_size: Option<u64>,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl PagingSettings {
    /// Load settings from all sources
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for paging config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading paging configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        Self::extract(&figment)
    }

    /// Load settings from a specific file, still honouring environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX));

        Self::extract(&figment)
    }

    fn extract(figment: &Figment) -> Result<Self> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no builder could honour
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::InvalidSettings(
                "default_page_size must be positive".to_string(),
            ));
        }
        if self.max_page_size == Some(0) {
            return Err(Error::InvalidSettings(
                "max_page_size must be positive when set".to_string(),
            ));
        }
        if let Some(max) = self.max_page_size {
            if self.default_page_size > max {
                return Err(Error::InvalidSettings(format!(
                    "default_page_size {} exceeds max_page_size {}",
                    self.default_page_size, max
                )));
            }
        }
        Ok(())
    }

    /// Default page size as a non-zero value
    pub fn default_size(&self) -> NonZeroU64 {
        NonZeroU64::new(self.default_page_size)
            .or(NonZeroU64::new(DEFAULT_PAGE_SIZE))
            .unwrap_or(NonZeroU64::MIN)
    }

    /// Maximum page size, if one is configured
    pub fn max_size(&self) -> Option<NonZeroU64> {
        self.max_page_size.and_then(NonZeroU64::new)
    }

    /// Config file locations in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-paging");
        if let Some(path) = xdg_dirs.find_config_file(CONFIG_FILE) {
            paths.push(path);
        }

        paths
    }
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: None,
            log_level: default_log_level(),
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}
