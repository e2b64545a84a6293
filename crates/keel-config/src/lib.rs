//! # keel-config
//!
//! Layered configuration loading for Keel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`KEEL_*` prefix, `__` as separator)
//! 2. Project-level `.keel/config.toml`
//! 3. User-level `~/.config/keel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `KEEL_DATABASE__URL` -> `database.url`, `KEEL_IDENTITY__ORG_ID` -> `identity.org_id`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use keel_config::KeelConfig;
//!
//! let config = KeelConfig::load_with_dotenv().expect("config");
//! let tenant = config.identity.tenant().expect("identity");
//! println!("running as {} in {}", tenant.user_id, tenant.org_id);
//! ```

mod database;
mod error;
mod general;
mod identity;
mod storage;
mod survey;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use identity::IdentityConfig;
pub use storage::StorageConfig;
pub use survey::SurveyConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local directory holding `config.toml`, the database, and local attachments.
pub const PROJECT_DIR: &str = ".keel";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeelConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl KeelConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Like [`Self::load`], reading the project layer from `<root>/.keel/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source fails to parse or a value
    /// has the wrong type.
    pub fn load_in(root: &Path) -> Result<Self, ConfigError> {
        Self::figment_in(root).extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_in(Path::new("."))
    }

    /// The provider chain with the project layer taken from `root`.
    #[must_use]
    pub fn figment_in(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = Self::project_config_path(root);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("KEEL_").split("__"))
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keel").join("config.toml"))
    }

    /// `<root>/.keel/config.toml`.
    #[must_use]
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_DIR).join("config.toml")
    }

    /// Render a starter `config.toml` for `keel init`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the config cannot be serialized.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".into(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = KeelConfig::default();
        assert!(!config.database.is_remote());
        assert!(!config.identity.is_configured());
        assert!(!config.storage.is_s3_configured());
        assert_eq!(config.general.default_limit, 20);
    }

    #[test]
    fn starter_toml_parses_back() {
        let mut config = KeelConfig::default();
        config.identity.org_id = "org_acme".into();
        config.identity.user_id = "usr_\"quoted\"".into();
        let rendered = config.to_toml().unwrap();
        let parsed: KeelConfig = Figment::new()
            .merge(Toml::string(&rendered))
            .extract()
            .unwrap();
        assert_eq!(parsed, config);
    }
}
