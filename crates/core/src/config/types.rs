use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::retro::DEFAULT_MAX_NOTES;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub default_vault: Option<String>,
    #[serde(default)]
    pub vaults: BTreeMap<String, VaultEntry>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub retro_linking: RetroLinkingConfig,
}

#[derive(Debug, Deserialize)]
pub struct VaultEntry {
    pub path: String,
    #[serde(default)]
    pub mode: VaultAccess,
    /// Folders to skip when indexing (relative to the vault path).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

/// Whether the engine may write to a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaultAccess {
    #[default]
    ReadWrite,
    ReadOnly,
}

impl VaultAccess {
    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadWrite => "read-write",
            Self::ReadOnly => "read-only",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Limits for retroactive linking.
#[derive(Debug, Deserialize, Clone)]
pub struct RetroLinkingConfig {
    /// Notes rewritten per apply call (default: 10)
    #[serde(default = "default_max_notes")]
    pub max_notes: usize,
}

impl Default for RetroLinkingConfig {
    fn default() -> Self {
        Self { max_notes: default_max_notes() }
    }
}

fn default_max_notes() -> usize {
    DEFAULT_MAX_NOTES
}

/// A configured vault with its path expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultConfig {
    pub alias: String,
    pub root: PathBuf,
    pub mode: VaultAccess,
    /// Relative to `root`.
    pub excluded_folders: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub default_vault: String,
    pub vaults: BTreeMap<String, VaultConfig>,
    pub logging: LoggingConfig,
    pub retro_linking: RetroLinkingConfig,
}

impl ResolvedConfig {
    pub fn vault(&self, alias: &str) -> Option<&VaultConfig> {
        self.vaults.get(alias)
    }

    /// Aliases in sorted order.
    pub fn aliases(&self) -> Vec<String> {
        self.vaults.keys().cloned().collect()
    }
}
