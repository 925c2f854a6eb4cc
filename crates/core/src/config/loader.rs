use crate::config::types::{ConfigFile, LoggingConfig, ResolvedConfig, VaultConfig, VaultEntry};
use shellexpand::full;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("vault '{0}' not found")]
    VaultNotFound(String),

    #[error("no vaults defined in config")]
    NoVaults,

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("home directory not available to expand '~'")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and resolve the config file. `vault_override` replaces
    /// `default_vault`.
    pub fn load(
        config_path: Option<&Path>,
        vault_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        Self::parse(&s, &path.display().to_string(), vault_override)
    }

    /// Resolve config from TOML text. `origin` only labels errors.
    pub fn parse(
        s: &str,
        origin: &str,
        vault_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let cf: ConfigFile =
            toml::from_str(s).map_err(|e| ConfigError::ParseError(origin.to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }
        if cf.vaults.is_empty() {
            return Err(ConfigError::NoVaults);
        }
        if cf.retro_linking.max_notes == 0 {
            return Err(ConfigError::InvalidValue(
                "retro_linking.max_notes",
                "must be at least 1".to_string(),
            ));
        }

        let mut vaults = BTreeMap::new();
        for (alias, entry) in &cf.vaults {
            vaults.insert(alias.clone(), Self::resolve_vault(alias, entry)?);
        }

        // A lone vault is the default even when not named.
        let default_vault = vault_override
            .map(ToOwned::to_owned)
            .or(cf.default_vault.clone())
            .or_else(|| (vaults.len() == 1).then(|| vaults.keys().next().cloned()).flatten())
            .unwrap_or_else(|| "default".to_string());

        if !vaults.contains_key(&default_vault) {
            return Err(ConfigError::VaultNotFound(default_vault));
        }

        Ok(ResolvedConfig {
            default_vault,
            vaults,
            logging: Self::resolve_logging(&cf.logging)?,
            retro_linking: cf.retro_linking.clone(),
        })
    }

    fn resolve_vault(alias: &str, entry: &VaultEntry) -> Result<VaultConfig, ConfigError> {
        if alias.is_empty() || alias.contains(':') {
            return Err(ConfigError::InvalidValue("vault alias", format!("'{}'", alias)));
        }

        Ok(VaultConfig {
            alias: alias.to_string(),
            root: expand_path(&entry.path)?,
            mode: entry.mode,
            excluded_folders: entry.excluded_folders.iter().map(PathBuf::from).collect(),
        })
    }

    fn resolve_logging(log_cfg: &LoggingConfig) -> Result<LoggingConfig, ConfigError> {
        // Resolve log file path if present
        let file = match &log_cfg.file {
            Some(file) => Some(expand_path(&file.to_string_lossy())?),
            None => None,
        };

        Ok(LoggingConfig {
            level: log_cfg.level.clone(),
            file_level: log_cfg.file_level.clone(),
            file,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("palace").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("palace").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}
