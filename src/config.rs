use std::path::Path;

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::alerts::AlertConfig;
use crate::core::ambient::AnimationConfig;
use crate::core::logging::LogConfig;
use crate::core::submission::SubmissionConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level UI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub alerts: AlertConfig,
    pub submission: SubmissionConfig,
    pub animation: AnimationConfig,
    pub logging: LogConfig,
}

impl UiConfig {
    /// Defaults overlaid with `path` when that file exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {}; using defaults", path.display());
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .extract()?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.animation.progress_steps == 0 {
            return Err(ConfigError::Invalid("animation.progress_steps must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.animation.scroll_threshold) {
            return Err(ConfigError::Invalid(format!(
                "animation.scroll_threshold must be within 0..=1, got {}",
                self.animation.scroll_threshold
            )));
        }
        if self.alerts.max_visible == 0 {
            return Err(ConfigError::Invalid("alerts.max_visible must be at least 1".into()));
        }
        if self.submission.request_header.trim().is_empty() {
            return Err(ConfigError::Invalid("submission.request_header is empty".into()));
        }
        Ok(())
    }
}
