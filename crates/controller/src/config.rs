use cartwalker_anim::{BlendTimings, CascadeTimings};
use cartwalker_motion::LocomotionConfig;
use cartwalker_projectile::ProjectileConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading controller configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Every tunable of the character, with the authored values as defaults.
///
/// Missing sections or fields in a config file fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub locomotion: LocomotionConfig,
    pub blend: BlendTimings,
    pub cascade: CascadeTimings,
    pub projectile: ProjectileConfig,
}

impl ControllerConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
