//! Configuration loading and resolution
//!
//! Every setting is resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Public OCL API used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.openconceptlab.org";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "OCL_API_URL";
pub const ENV_API_TOKEN: &str = "OCL_API_TOKEN";
pub const ENV_HOST: &str = "OCL_WEB_HOST";
pub const ENV_PORT: &str = "OCL_WEB_PORT";
pub const ENV_LOG_LEVEL: &str = "OCL_LOG_LEVEL";
pub const ENV_TIMEOUT_SECS: &str = "OCL_REQUEST_TIMEOUT_SECS";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Base URL of the terminology REST API, without trailing slash
    pub api_url: String,
    pub api_token: Option<String>,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from all four tiers.
    ///
    /// A missing default config file is not an error (defaults are used),
    /// but a malformed one is, as is an explicit `--config` path that
    /// does not exist.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file_config = match &overrides.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                load_toml(path)?
            }
            None => match default_config_file() {
                Some(path) => load_toml(&path)?,
                None => TomlConfig::default(),
            },
        };

        Ok(Self::merge(overrides, &env_config(), &file_config))
    }

    /// Merge the tiers without touching the environment or filesystem
    pub fn merge(cli: &Overrides, env: &TomlConfig, file: &TomlConfig) -> Self {
        let defaults = Self::default();

        let api_url = cli
            .api_url
            .clone()
            .or_else(|| env.api_url.clone())
            .or_else(|| file.api_url.clone())
            .unwrap_or(defaults.api_url);

        let timeout_secs = env
            .request_timeout_secs
            .or(file.request_timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: cli
                .api_token
                .clone()
                .or_else(|| env.api_token.clone())
                .or_else(|| file.api_token.clone())
                .filter(|t| !t.trim().is_empty()),
            host: cli
                .host
                .clone()
                .or_else(|| env.host.clone())
                .or_else(|| file.host.clone())
                .unwrap_or(defaults.host),
            port: cli.port.or(env.port).or(file.port).unwrap_or(defaults.port),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| env.log_level.clone())
                .or_else(|| file.log_level.clone())
                .unwrap_or(defaults.log_level),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML config file
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Read the environment tier
fn env_config() -> TomlConfig {
    TomlConfig {
        api_url: std::env::var(ENV_API_URL).ok(),
        api_token: std::env::var(ENV_API_TOKEN).ok(),
        host: std::env::var(ENV_HOST).ok(),
        port: parse_env(ENV_PORT),
        log_level: std::env::var(ENV_LOG_LEVEL).ok(),
        request_timeout_secs: parse_env(ENV_TIMEOUT_SECS),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

/// Locate the default configuration file for the platform, if one exists
pub fn default_config_file() -> Option<PathBuf> {
    // ~/.config/ocl/config.toml first, then /etc/ocl/config.toml
    let user_config = dirs::config_dir().map(|d| d.join("ocl").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/ocl/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_uses_defaults_when_empty() {
        let config = ServiceConfig::merge(
            &Overrides::default(),
            &TomlConfig::default(),
            &TomlConfig::default(),
        );
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:5780");
    }

    #[test]
    fn test_merge_priority_order() {
        let cli = Overrides {
            port: Some(9000),
            ..Default::default()
        };
        let env = TomlConfig {
            port: Some(8000),
            api_url: Some("http://env.example/".to_string()),
            ..Default::default()
        };
        let file = TomlConfig {
            port: Some(7000),
            api_url: Some("http://file.example".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        let config = ServiceConfig::merge(&cli, &env, &file);
        assert_eq!(config.port, 9000);
        // Trailing slash trimmed
        assert_eq!(config.api_url, "http://env.example");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let file = TomlConfig {
            api_token: Some("   ".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::merge(&Overrides::default(), &TomlConfig::default(), &file);
        assert!(config.api_token.is_none());
    }
}
