//! Configuration file
//!
//! Every field has a default, so `{}` is a valid config. The JWT secret
//! may be supplied through `HBNB_JWT_SECRET` instead of the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::auth::JwtConfig;
use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;
use crate::repository::StorageConfig;

/// Environment variable overriding `jwt.secret`
pub const JWT_SECRET_ENV: &str = "HBNB_JWT_SECRET";

/// Administrator seeded at start when no user has this email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            storage: StorageConfig::default(),
            jwt: JwtConfig::default(),
            log_format: LogFormat::default(),
            bootstrap_admin: None,
        }
    }
}

impl Config {
    /// Config written by `hbnb init`: durable storage under `data_dir`
    pub fn initial(data_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig::File { data_dir },
            ..Default::default()
        }
    }

    /// Load configuration from file, apply the environment override and validate
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        let config = config.with_secret_override(std::env::var(JWT_SECRET_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Replace the JWT secret when an override is present and non-empty
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.jwt.secret = secret;
        }
        self
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.jwt.secret.trim().is_empty() {
            return Err(CliError::config_error(format!(
                "jwt.secret must not be empty (set it in the config or via {})",
                JWT_SECRET_ENV
            )));
        }

        if self.jwt.access_token_ttl_minutes <= 0 {
            return Err(CliError::config_error(
                "jwt.access_token_ttl_minutes must be > 0",
            ));
        }

        if let StorageConfig::File { data_dir } = &self.storage {
            if data_dir.as_os_str().is_empty() {
                return Err(CliError::config_error(
                    "storage.data_dir must not be empty for file storage",
                ));
            }
        }

        Ok(())
    }

    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
        }
    }

    /// Data directory when storage is durable
    pub fn data_path(&self) -> Option<&Path> {
        match &self.storage {
            StorageConfig::File { data_dir } => Some(data_dir),
            StorageConfig::Memory => None,
        }
    }

    /// True while the secret is still the shipped placeholder
    pub fn uses_default_secret(&self) -> bool {
        self.jwt.secret == JwtConfig::default().secret
    }
}
