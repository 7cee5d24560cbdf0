//! The CLI config file: logging plus the controller tunables.

use std::path::Path;

use headmouse_common::config::{load_or_default, load_strict, LoggingConfig};
use headmouse_pointer_core::ControllerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub controller: ControllerConfig,
}

impl AppConfig {
    /// Load `path` if it exists. A present but broken file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config: Self = load_strict(path)?;
        config.controller.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults on any failure.
    pub fn load_lenient(path: &Path) -> Self {
        load_or_default(path)
    }
}
