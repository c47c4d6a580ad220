//! Configuration file support for Slipway.
//!
//! Slipway reads two configuration files:
//! - Global: `config.toml` in the Slipway home directory - user-wide defaults
//! - Project: `.slipway/config.toml` next to the manifest - project overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::ChainPolicy;

/// Slipway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library resolution settings
    pub resolve: ResolveConfig,
}

/// `[resolve]` settings. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// How locator answers are combined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<ChainPolicy>,

    /// Whether prebuilt repositories are searched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prebuilt: Option<bool>,
}

impl ResolveConfig {
    pub fn policy(&self) -> ChainPolicy {
        self.policy.unwrap_or_default()
    }

    pub fn prebuilt(&self) -> bool {
        self.prebuilt.unwrap_or(true)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    /// Load the global layer, then the project layer on top of it.
    pub fn load_layered(global: &Path, project: &Path) -> Self {
        let mut config = Self::load_or_default(global);
        config.merge(Self::load_or_default(project));
        config
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.resolve.policy.is_some() {
            self.resolve.policy = other.resolve.policy;
        }
        if other.resolve.prebuilt.is_some() {
            self.resolve.prebuilt = other.resolve.prebuilt;
        }
    }
}
