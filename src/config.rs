//! Configuration Management
//!
//! Handles persistent configuration storage for apigw.

use crate::endpoint::{CatalogBuilder, EndpointRegistry};
use crate::gateway::DEFAULT_USER_AGENT;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "APIGW_BASE_URL";
/// Environment variable overriding the API key
pub const ENV_API_KEY: &str = "APIGW_API_KEY";

const DEFAULT_BASE_URL: &str = "https://apigateway.apigw.ntruss.com/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gateway API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-call timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Extra endpoint catalogs (JSON or YAML) merged over the builtin one
    #[serde(default)]
    pub catalog_files: Vec<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("apigw").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective base URL (CLI > env > config > default)
    pub fn effective_base_url(&self, cli: Option<&str>) -> String {
        resolve(cli, ENV_BASE_URL, self.base_url.as_deref())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective API key (CLI > env > config)
    pub fn effective_api_key(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_API_KEY, self.api_key.as_deref())
    }

    /// Get effective timeout (CLI > config > default)
    pub fn effective_timeout(&self, cli: Option<u64>) -> Duration {
        Duration::from_secs(cli.or(self.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Builtin catalog merged with the configured catalog files
    pub fn registry(&self) -> Result<EndpointRegistry> {
        let mut builder = CatalogBuilder::new().with_builtin()?;
        for path in &self.catalog_files {
            builder = builder
                .add_file(path)
                .with_context(|| format!("Failed to load catalog {:?}", path))?;
        }
        Ok(builder.build()?)
    }

    /// Set the stored base URL after checking it parses
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid base URL `{}`", base_url))?;
        if parsed.cannot_be_a_base() {
            bail!("Base URL `{}` cannot carry a path", base_url);
        }
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(())
    }
}

fn resolve(cli: Option<&str>, env: &str, file: Option<&str>) -> Option<String> {
    cli.map(str::to_string)
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
        .or_else(|| file.map(str::to_string))
}
