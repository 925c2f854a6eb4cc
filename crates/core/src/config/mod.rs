//! TOML configuration: vaults, logging and retroactive linking limits.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{LoggingConfig, ResolvedConfig, RetroLinkingConfig, VaultAccess, VaultConfig};
