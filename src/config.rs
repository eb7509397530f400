//! Configuration for the licensing subsystem.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `licensegate.toml` file (or an explicit path)
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `LICENSEGATE_SECRET_KEY` - HMAC secret (legacy name: `LICENSE_SECRET_KEY`)
//! - `LICENSEGATE_ENV` - `development` or `production`
//! - `LICENSEGATE_APP_DIR` - Subfolder of the per-user data directory
//! - `LICENSEGATE_LICENSE_FILE` - License file name
//! - `LICENSEGATE_MIGRATE_LEGACY` - Copy legacy license files to the canonical location
//! - `LICENSEGATE_LOGGING_ENABLED` - Enable logging
//! - `LICENSEGATE_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//!
//! The loaded value is handed to [`crate::gate::Licensing::from_config`] once
//! at startup; there is no global configuration state.

use std::env;
use std::path::Path;

use config::{Config, ConfigBuilder, File};
use serde::Deserialize;

use crate::errors::{LicenseError, LicenseResult};
use crate::signing::SecretKey;

/// Secret used outside production when none is configured.
pub const DEVELOPMENT_SECRET_KEY: &str = "test_secret_key_12345";

/// Base name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "licensegate";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicensingConfig {
    /// Signing configuration
    pub license: LicenseConfig,
    /// License file locations
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Signing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// HMAC secret shared by the generator and the verifier
    pub secret_key: String,
    /// Deployment environment: "development" or "production"
    pub environment: String,
    /// Client name written into keys when none is given
    pub default_client_name: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            environment: "development".to_string(),
            default_client_name: "User".to_string(),
        }
    }
}

/// License file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Subfolder of the per-user data directory
    pub app_dir_name: String,
    /// Name of the license file
    pub file_name: String,
    /// Look for legacy files next to the executable
    pub search_install_dir: bool,
    /// Look for legacy files in the current working directory
    pub search_working_dir: bool,
    /// Copy a legacy file into the canonical location when found
    pub migrate_legacy: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            app_dir_name: "licensegate".to_string(),
            file_name: "license.key".to_string(),
            search_install_dir: true,
            search_working_dir: true,
            migrate_legacy: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

fn config_err(e: config::ConfigError) -> LicenseError {
    LicenseError::ConfigError(e.to_string())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| v.parse::<bool>().ok())
}

impl LicensingConfig {
    /// Load configuration from `licensegate.toml` (optional) and the environment.
    pub fn load() -> LicenseResult<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE_NAME).required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file and the environment.
    ///
    /// The file must exist.
    pub fn load_from(path: &Path) -> LicenseResult<Self> {
        let builder = Self::defaults()?.add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn defaults() -> LicenseResult<ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Config::builder()
            .set_default("license.secret_key", defaults.license.secret_key)
            .map_err(config_err)?
            .set_default("license.environment", defaults.license.environment)
            .map_err(config_err)?
            .set_default("license.default_client_name", defaults.license.default_client_name)
            .map_err(config_err)?
            .set_default("storage.app_dir_name", defaults.storage.app_dir_name)
            .map_err(config_err)?
            .set_default("storage.file_name", defaults.storage.file_name)
            .map_err(config_err)?
            .set_default("storage.search_install_dir", defaults.storage.search_install_dir)
            .map_err(config_err)?
            .set_default("storage.search_working_dir", defaults.storage.search_working_dir)
            .map_err(config_err)?
            .set_default("storage.migrate_legacy", defaults.storage.migrate_legacy)
            .map_err(config_err)?
            .set_default("logging.enabled", defaults.logging.enabled)
            .map_err(config_err)?
            .set_default("logging.level", defaults.logging.level)
            .map_err(config_err)
    }

    fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> LicenseResult<Self> {
        let secret = env::var("LICENSEGATE_SECRET_KEY")
            .or_else(|_| env::var("LICENSE_SECRET_KEY"))
            .ok();

        let settings = builder
            .set_override_option("license.secret_key", secret)
            .map_err(config_err)?
            .set_override_option("license.environment", env::var("LICENSEGATE_ENV").ok())
            .map_err(config_err)?
            .set_override_option("storage.app_dir_name", env::var("LICENSEGATE_APP_DIR").ok())
            .map_err(config_err)?
            .set_override_option("storage.file_name", env::var("LICENSEGATE_LICENSE_FILE").ok())
            .map_err(config_err)?
            .set_override_option(
                "storage.migrate_legacy",
                env_bool("LICENSEGATE_MIGRATE_LEGACY"),
            )
            .map_err(config_err)?
            .set_override_option("logging.enabled", env_bool("LICENSEGATE_LOGGING_ENABLED"))
            .map_err(config_err)?
            .set_override_option("logging.level", env::var("LICENSEGATE_LOG_LEVEL").ok())
            .map_err(config_err)?
            .build()
            .map_err(|e| LicenseError::ConfigError(format!("failed to build config: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| LicenseError::ConfigError(format!("failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LicenseResult<()> {
        match self.license.environment.to_lowercase().as_str() {
            "development" | "production" => {}
            other => {
                return Err(LicenseError::ConfigError(format!(
                    "license.environment must be 'development' or 'production', got '{other}'"
                )));
            }
        }

        if self.storage.app_dir_name.trim().is_empty() {
            return Err(LicenseError::ConfigError(
                "storage.app_dir_name cannot be empty".to_string(),
            ));
        }

        let file_name = self.storage.file_name.trim();
        if file_name.is_empty() {
            return Err(LicenseError::ConfigError(
                "storage.file_name cannot be empty".to_string(),
            ));
        }
        if file_name.contains(['/', '\\']) {
            return Err(LicenseError::ConfigError(format!(
                "storage.file_name must be a bare file name, got '{file_name}'"
            )));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(LicenseError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }

    /// Returns `true` when running in production mode.
    pub fn is_production(&self) -> bool {
        self.license.environment.eq_ignore_ascii_case("production")
    }

    /// Resolve the signing secret.
    ///
    /// Production requires an explicit secret. Other environments fall back to
    /// [`DEVELOPMENT_SECRET_KEY`] so development keys survive restarts.
    pub fn secret_key(&self) -> LicenseResult<SecretKey> {
        if !self.license.secret_key.is_empty() {
            return Ok(SecretKey::from(self.license.secret_key.as_str()));
        }

        if self.is_production() {
            return Err(LicenseError::ConfigError(
                "license.secret_key is required in production (set LICENSEGATE_SECRET_KEY)"
                    .to_string(),
            ));
        }

        log::warn!("No license secret configured, using the fixed development secret");
        Ok(SecretKey::from(DEVELOPMENT_SECRET_KEY))
    }
}
