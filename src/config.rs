use crate::constants::{DEFAULT_FYYUR_PORT, DEFAULT_TRIVIA_PORT};
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub fyyur: AppConfig,
    pub trivia: AppConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Per-application settings. Both apps share the shape; defaults differ.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    fyyur: Option<RawAppConfig>,
    trivia: Option<RawAppConfig>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawAppConfig {
    port: Option<u16>,
    database: Option<String>,
}

impl RawAppConfig {
    fn resolve(self, port: u16, database: &str) -> AppConfig {
        AppConfig {
            port: self.port.unwrap_or(port),
            database: self.database.unwrap_or_else(|| database.to_string()),
        }
    }
}

impl Config {
    /// Load from a TOML file. A missing file yields the defaults; a malformed one is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&content)?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        Self {
            server: raw.server,
            fyyur: raw
                .fyyur
                .unwrap_or_default()
                .resolve(DEFAULT_FYYUR_PORT, "data/fyyur.db"),
            trivia: raw
                .trivia
                .unwrap_or_default()
                .resolve(DEFAULT_TRIVIA_PORT, "data/trivia.db"),
            logging: raw.logging,
        }
    }

    fn apply_env(&mut self) {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(db) = env::var("FYYUR_DATABASE") {
            self.fyyur.database = db;
        }
        if let Ok(db) = env::var("TRIVIA_DATABASE") {
            self.trivia.database = db;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        for (key, port) in [
            ("FYYUR_PORT", &mut self.fyyur.port),
            ("TRIVIA_PORT", &mut self.trivia.port),
        ] {
            if let Ok(value) = env::var(key) {
                match value.parse() {
                    Ok(p) => *port = p,
                    Err(e) => warn!("Invalid {key} value '{value}': {e}"),
                }
            }
        }
    }
}
