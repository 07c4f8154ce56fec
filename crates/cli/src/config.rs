//! Service configuration, loaded once from a YAML file at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use db::pool::{PgConnectOptions, PgSslMode};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("decoding yaml failed: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{section} config validation failed: {message}")]
    Invalid {
        section: &'static str,
        message: &'static str,
    },

    #[error("invalid database url: {0}")]
    DatabaseUrl(String),
}

fn invalid(section: &'static str, message: &'static str) -> ConfigError {
    ConfigError::Invalid { section, message }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logger: LoggerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub app_server_port: u16,
    pub healthcheck_port: u16,
    pub jwt_authentication: bool,
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub db: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            user: String::new(),
            pass: String::new(),
            db: String::new(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Text,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: String,
    pub format: Option<LogFormat>,
}

impl Config {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(invalid("service", "service name is required"));
        }
        if self.environment.is_empty() {
            return Err(invalid("service", "environment is required"));
        }
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_server_port == 0 {
            return Err(invalid("server", "app server port is required"));
        }
        if self.healthcheck_port == 0 {
            return Err(invalid("server", "healthcheck port is required"));
        }
        if self.app_server_port == self.healthcheck_port {
            return Err(invalid("server", "app and healthcheck ports must differ"));
        }
        if self.jwt_authentication && self.jwt_secret.is_empty() {
            return Err(invalid("server", "jwt secret is required when jwt authentication is on"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db.is_empty() {
            return Err(invalid("database", "db name is required"));
        }
        if self.user.is_empty() {
            return Err(invalid("database", "user is required"));
        }
        if self.pass.is_empty() {
            return Err(invalid("database", "password is required"));
        }
        if self.host.is_empty() {
            return Err(invalid("database", "host is required"));
        }
        if self.port == 0 {
            return Err(invalid("database", "port is required"));
        }
        if self.max_connections == 0 {
            return Err(invalid("database", "max connections must be positive"));
        }
        Ok(())
    }

    /// Connect options for the pool. `database_url`, when given, replaces the
    /// fields of this section.
    pub fn connect_options(
        &self,
        database_url: Option<&str>,
    ) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = database_url {
            return PgConnectOptions::from_str(url)
                .map_err(|err| ConfigError::DatabaseUrl(err.to_string()));
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.pass)
            .database(&self.db)
            .ssl_mode(PgSslMode::Disable))
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.is_empty() {
            return Err(invalid("logger", "level is required"));
        }
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(invalid("logger", "level must be one of trace, debug, info, warn, error"));
        }
        if self.format.is_none() {
            return Err(invalid("logger", "format is required"));
        }
        Ok(())
    }

    pub fn format(&self) -> LogFormat {
        self.format.unwrap_or_default()
    }
}
