//! Configuration management for Keysmith

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every environment variable read by [`KeysmithConfig::from_env`]
pub const ENV_PREFIX: &str = "KEYSMITH";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Default algorithm variant per family, by registry name
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DefaultVariants {
    pub aead: String,
    pub mac: String,
    pub signature: String,
    pub hybrid: String,
}

/// Application configuration
#[derive(Clone, Deserialize)]
pub struct KeysmithConfig {
    /// Directory keyset files are resolved against
    pub keyset_dir: PathBuf,
    pub log_level: String,
    /// Emit JSON logs instead of human-readable ones
    pub log_json: bool,
    /// Secret the master key is built from; hex or passphrase
    pub master_key: Option<String>,
    pub default_aead: String,
    pub default_mac: String,
    pub default_signature: String,
    pub default_hybrid: String,
}

impl KeysmithConfig {
    /// Load configuration from `KEYSMITH_*` environment variables, reading
    /// a `.env` file first if there is one
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(env: config::Environment) -> Result<Self, ConfigError> {
        let cfg: KeysmithConfig = config::Config::builder()
            .set_default("keyset_dir", "./keysets")?
            .set_default("log_level", "info")?
            .set_default("log_json", false)?
            .set_default("default_aead", "aes256-gcm")?
            .set_default("default_mac", "hmac-sha256")?
            .set_default("default_signature", "ed25519")?
            .set_default("default_hybrid", "x25519-hkdf-sha256-aes256-gcm")?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.keyset_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "keyset_dir",
                reason: "must not be empty".to_string(),
            });
        }
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                key: "log_level",
                reason: format!("unknown level {:?}", self.log_level),
            });
        }
        Ok(())
    }

    /// Resolve a keyset file name against the keyset directory
    pub fn keyset_path(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.keyset_dir.join(name)
        }
    }

    /// Get log level, lowercased
    pub fn log_level(&self) -> String {
        self.log_level.to_ascii_lowercase()
    }

    pub fn master_key(&self) -> Option<&str> {
        self.master_key.as_deref()
    }

    pub fn default_variants(&self) -> DefaultVariants {
        DefaultVariants {
            aead: self.default_aead.clone(),
            mac: self.default_mac.clone(),
            signature: self.default_signature.clone(),
            hybrid: self.default_hybrid.clone(),
        }
    }
}

impl fmt::Debug for KeysmithConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysmithConfig")
            .field("keyset_dir", &self.keyset_dir)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_variants", &self.default_variants())
            .finish()
    }
}
