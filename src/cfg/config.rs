// src/cfg/config.rs

use eyre::{eyre, Result};
use log::{debug, error};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cfg::modes::{AuthMode, CallbackConvention};

/// Selects which harness variant a `TestController` behaves as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(alias = "callback-convention", alias = "callback_convention")]
    pub convention: CallbackConvention,

    #[serde(alias = "auth-mode")]
    pub auth_mode: AuthMode,
}

impl HarnessConfig {
    pub fn with_convention(mut self, convention: CallbackConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    /// Parse a config from YAML text. Empty input yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            error!("Failed to parse YAML: {}", e);
            eyre!("Failed to parse YAML: {}", e)
        })
    }
}

pub fn load_config(config_path: &Path) -> Result<HarnessConfig> {
    debug!("Loading harness configuration from {:?}", config_path);

    let content = fs::read_to_string(config_path).map_err(|e| {
        error!("Failed to read config file {}: {}", config_path.display(), e);
        eyre!("Failed to read config file {}: {}", config_path.display(), e)
    })?;

    let cfg = HarnessConfig::from_yaml(&content)?;

    debug!("Loaded harness configuration: {:?}", cfg);
    Ok(cfg)
}
