//! Unified path management for TabSage files.

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for tabsage_core::TabSageError {
    fn from(e: PathError) -> Self {
        tabsage_core::TabSageError::config(e.to_string())
    }
}

/// Locations of every file TabSage reads or writes.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/tabsage/
/// ├── config.toml     # Non-secret settings
/// ├── secret.json     # API keys
/// ├── storage.json    # Key-value store holding tab_{id} session records
/// ├── archive.json    # Pages captured for domain/all context
/// └── logs/
///     └── tabsage.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSagePaths {
    base: PathBuf,
}

impl TabSagePaths {
    /// Resolves the platform config directory (`~/.config/tabsage` on Linux).
    pub fn resolve() -> Result<Self, PathError> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or(PathError::HomeDirNotFound)?
            .join("tabsage");
        Ok(Self { base })
    }

    /// Uses `base` as the config directory (tests, `--config-dir`).
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Path to `secret.json`; keep it user-readable only.
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.base.join("storage.json")
    }

    pub fn archive_file(&self) -> PathBuf {
        self.base.join("archive.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }
}
