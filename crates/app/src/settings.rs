//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `FAIRSHARE__*` environment variables, e.g.
//! `FAIRSHARE__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settlement {
    /// Largest absolute balance, in minor units, treated as settled.
    pub tolerance_minor: i64,
}

impl Default for Settlement {
    fn default() -> Self {
        Self {
            tolerance_minor: engine::DEFAULT_TOLERANCE.minor(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub settlement: Settlement,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("settings")
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("FAIRSHARE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
