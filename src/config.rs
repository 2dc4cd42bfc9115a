use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use crate::constants::DEFAULT_DOWNSTREAM_URL;
use crate::error::{ForwarderError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downstream: DownstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownstreamConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DOWNSTREAM_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl Config {
    /// Load `config.toml` (or the given path) and apply `FORWARDER_*` overrides.
    ///
    /// A missing file at the default path falls back to built-in defaults; a
    /// missing file at an explicitly requested path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ForwarderError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        tracing::info!("Loading config from: {}", path.display());
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FORWARDER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("FORWARDER_PORT") {
            self.server.port = parse_override("FORWARDER_PORT", &v)?;
        }
        if let Some(v) = lookup("FORWARDER_MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_override("FORWARDER_MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = lookup("FORWARDER_DOWNSTREAM_URL") {
            self.downstream.url = v;
        }
        if let Some(v) = lookup("FORWARDER_TIMEOUT_SECONDS") {
            self.downstream.timeout_seconds = parse_override("FORWARDER_TIMEOUT_SECONDS", &v)?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| ForwarderError::Config(format!("Invalid bind address '{}': {}", addr, e)))
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        ForwarderError::Config(format!("{} has invalid value '{}': {}", key, value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.downstream.url, "http://127.0.0.1:8000/api/add_product/");
        assert_eq!(config.downstream.timeout_seconds, 30);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[downstream]\nurl = \"http://inventory.internal/api/add_product/\"\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.downstream.url, "http://inventory.internal/api/add_product/");
        assert_eq!(config.downstream.timeout_seconds, 30);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(missing.as_path())),
            Err(ForwarderError::Config(_))
        ));
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FORWARDER_PORT", "9001"),
            ("FORWARDER_DOWNSTREAM_URL", "http://mock:9000/api/add_product/"),
            ("FORWARDER_TIMEOUT_SECONDS", " 5 "),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.downstream.url, "http://mock:9000/api/add_product/");
        assert_eq!(config.downstream.timeout_seconds, 5);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "FORWARDER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("FORWARDER_PORT"));
    }
}
