//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::RunnerConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "XCUI_RUNNER_CONFIG";

/// Production implementation of `ConfigStore` that reads a YAML file.
///
/// An explicit path (flag or `XCUI_RUNNER_CONFIG`) must exist. The default
/// `~/.xcui-runner/config.yaml` is optional.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<RunnerConfig> {
        let Some(path) = self.path() else {
            return Ok(RunnerConfig::default());
        };
        if self.explicit.is_none() && !path.exists() {
            return Ok(RunnerConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: RunnerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }
        dirs::home_dir().map(|home| home.join(".xcui-runner").join("config.yaml"))
    }
}
