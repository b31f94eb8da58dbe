//! Configuration service.
//!
//! Loads `config.toml` and `secret.json` from the TabSage config directory
//! and caches them for the life of the process.

use crate::paths::TabSagePaths;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tabsage_core::config::{ApiKeyConfig, AppConfig, SecretConfig};
use tabsage_core::{Result, TabSageError};

/// Environment variables that override `secret.json`, by provider id.
pub const API_KEY_ENV_VARS: [(&str, &str); 3] = [
    ("gemini", "GEMINI_API_KEY"),
    ("perplexity", "PERPLEXITY_API_KEY"),
    ("xai", "XAI_API_KEY"),
];

/// Loads and caches configuration.
///
/// Missing files yield defaults; malformed files are `Config` errors so a
/// typo never silently resets settings.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: TabSagePaths,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: TabSagePaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn paths(&self) -> &TabSagePaths {
        &self.paths
    }

    /// Returns `config.toml`, reading it on first access.
    pub fn app_config(&self) -> Result<AppConfig> {
        {
            let cached = self
                .config
                .read()
                .map_err(|_| TabSageError::internal("config cache poisoned"))?;
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = load_app_config(&self.paths.config_file())?;

        let mut cached = self
            .config
            .write()
            .map_err(|_| TabSageError::internal("config cache poisoned"))?;
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Returns API keys from `secret.json` with environment overrides applied.
    ///
    /// Secrets are not cached.
    pub fn secrets(&self) -> Result<SecretConfig> {
        let mut secrets = load_secret_config(&self.paths.secret_file())?;
        apply_env_overrides(&mut secrets, |name| std::env::var(name).ok());
        Ok(secrets)
    }

    /// Forces the next `app_config` call to re-read the file.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cached) = self.config.write() {
            *cached = None;
        }
    }
}

fn load_app_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| TabSageError::config(format!("{}: {}", path.display(), e)))
}

fn load_secret_config(path: &Path) -> Result<SecretConfig> {
    if !path.exists() {
        return Ok(SecretConfig::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SecretConfig::default());
    }
    serde_json::from_str(&content)
        .map_err(|e| TabSageError::config(format!("{}: {}", path.display(), e)))
}

/// Replaces file keys with non-empty values from `lookup`.
pub fn apply_env_overrides<F>(secrets: &mut SecretConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (provider, var) in API_KEY_ENV_VARS {
        let Some(api_key) = lookup(var).filter(|key| !key.trim().is_empty()) else {
            continue;
        };
        tracing::debug!("[ConfigService] Using {} for provider '{}'", var, provider);
        let slot = match provider {
            "gemini" => &mut secrets.gemini,
            "perplexity" => &mut secrets.perplexity,
            _ => &mut secrets.xai,
        };
        *slot = Some(ApiKeyConfig { api_key });
    }
}
