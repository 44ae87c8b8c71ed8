use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ORG_URL_ENV: &str = "AZURE_ORG_URL";
pub const PAT_ENV: &str = "AZURE_PAT";

/// Persisted connection settings
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppConfig {
    /// e.g. `https://dev.azure.com/contoso`
    #[serde(default)]
    pub azure_org_url: String,

    /// Personal access token
    #[serde(default)]
    pub azure_pat: String,

    /// Per-request HTTP timeout; `0` disables it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine the user config directory")]
    NoHomeDir,
}

/// `{config_dir}/aztui/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(dir.join("aztui").join("config.json"))
}

impl AppConfig {
    pub fn new(azure_org_url: impl Into<String>, azure_pat: impl Into<String>) -> Self {
        Self {
            azure_org_url: azure_org_url.into(),
            azure_pat: azure_pat.into(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// File at `path` if it exists, with missing fields filled from `env`
    pub fn resolve<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = if path.exists() {
            Self::load_from(path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides(env))
    }

    /// Standard resolution: default path plus process environment
    pub fn discover() -> Result<(PathBuf, Self), ConfigError> {
        let path = default_config_path()?;
        let config = Self::resolve(&path, |key| std::env::var(key).ok())?;
        Ok((path, config))
    }

    /// Fill empty fields from the environment; values in the file win
    pub fn with_env_overrides<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.azure_org_url.trim().is_empty() {
            if let Some(url) = env(ORG_URL_ENV) {
                self.azure_org_url = url;
            }
        }
        if self.azure_pat.trim().is_empty() {
            if let Some(pat) = env(PAT_ENV) {
                self.azure_pat = pat;
            }
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.azure_org_url.trim().is_empty() && !self.azure_pat.trim().is_empty()
    }

    /// Organization URL without a trailing slash
    pub fn org_url(&self) -> &str {
        self.azure_org_url.trim().trim_end_matches('/')
    }

    /// `None` when requests should never time out
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Write as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        restrict_permissions(path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
