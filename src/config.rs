//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Organization selection
    #[serde(default)]
    pub organization: OrganizationConfig,

    /// Author identity used for created comments
    #[serde(default)]
    pub author: AuthorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            organization: OrganizationConfig::default(),
            author: AuthorConfig::default(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8000/graphql".to_string()
}

/// Organization-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationConfig {
    /// Slug of the organization to operate in
    #[serde(default)]
    pub slug: String,
}

/// Author identity configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorConfig {
    /// Email attached to created comments
    #[serde(default)]
    pub email: String,

    /// Optional display name; the backend derives one from the email
    /// when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Config {
    /// Load configuration from `dir/.taskboard.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("endpoint cannot be empty".to_string()));
        }
        Ok(())
    }
}
