//! Optional user configuration
//!
//! Read from `~/.config/dbctl/config.toml` (or `$DBCTL_CONFIG`) when
//! present. CLI flags always win over the file.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use dbctl_types::Engine;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Default namespace when -n is not given
    pub namespace: Option<String>,

    /// Container runtime binary
    pub docker_bin: Option<String>,

    /// Per-engine client image overrides, keyed by engine name
    pub images: HashMap<String, String>,
}

impl AppConfig {
    /// Load the config file if one exists; a missing file is not an error
    pub fn load() -> Result<Self> {
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config at {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Config file location: $DBCTL_CONFIG first, then the user config dir
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("DBCTL_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("dbctl").join("config.toml"))
    }

    pub fn docker_bin(&self) -> &str {
        self.docker_bin.as_deref().unwrap_or("docker")
    }

    /// Client image for an engine, honoring overrides from the file
    pub fn image_for(&self, engine: Engine) -> String {
        self.images
            .get(engine.as_str())
            .cloned()
            .unwrap_or_else(|| engine.default_image().to_string())
    }
}
