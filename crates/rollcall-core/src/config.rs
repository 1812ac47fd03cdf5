//! Application configuration.
//!
//! Loaded from a TOML file, with sensible defaults when no file exists.
//! Covers the server bind address, the broadcast session TTL, the timezone
//! used for calendar-date decisions, and the snapshot data directory.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RollcallError};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ROLLCALL_CONFIG";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollcallConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// How long a started beacon broadcast stays live, in seconds.
    pub broadcast_ttl_secs: u64,

    /// Timezone used to decide which calendar date an attendance timestamp
    /// falls on.
    #[serde(with = "timezone_serde")]
    pub timezone: Tz,

    /// Directory for the JSON directory snapshot. `None` means the platform
    /// default data directory.
    pub data_dir: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for RollcallConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            // Matches the original 5-minute broadcast window.
            broadcast_ttl_secs: 300,
            timezone: chrono_tz::UTC,
            data_dir: None,
        }
    }
}

impl RollcallConfig {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, parsed, or
    /// validated.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from a specific path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|err| RollcallError::ConfigParse(err.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|err| RollcallError::ConfigParse(err.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The broadcast TTL as a [`Duration`].
    #[must_use]
    pub fn broadcast_ttl(&self) -> Duration {
        Duration::from_secs(self.broadcast_ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.broadcast_ttl_secs == 0 {
            return Err(RollcallError::ConfigParse(
                "broadcast_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.broadcast_ttl_secs > 86_400 {
            return Err(RollcallError::ConfigParse(
                "broadcast_ttl_secs must not exceed one day".to_string(),
            ));
        }
        Ok(())
    }

    /// The configuration file path: `ROLLCALL_CONFIG` if set, otherwise the
    /// platform default.
    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        #[cfg(target_os = "linux")]
        {
            Ok(PathBuf::from("/etc/rollcall/config.toml"))
        }
        #[cfg(not(target_os = "linux"))]
        {
            let dirs = directories::ProjectDirs::from("", "", "rollcall").ok_or_else(|| {
                RollcallError::Storage("cannot determine config directory".to_string())
            })?;
            Ok(dirs.config_dir().join("config.toml"))
        }
    }
}

mod timezone_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
