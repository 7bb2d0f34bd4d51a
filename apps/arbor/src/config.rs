//! # Server Configuration
//!
//! Resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config FILE`)
//! 3. `ARBOR_*` environment variables
//! 4. CLI flags (applied by the command layer)
//!
//! ## Environment Variables
//!
//! - `ARBOR_HOST`, `ARBOR_PORT`: bind address
//! - `ARBOR_RATE_LIMIT`: requests per second, 0 disables
//! - `ARBOR_CORS_ORIGINS`: comma-separated origins, or "*" for all
//! - `ARBOR_API_KEY`: if set and non-empty, requires Bearer token auth
//! - `ARBOR_SEED`: seed document imported at startup

use arbor_core::ArborError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second. 0 disables rate limiting.
    pub rate_limit: u32,
    /// `None` means localhost only. A single `"*"` allows every origin.
    pub cors_origins: Option<Vec<String>>,
    pub api_key: Option<String>,
    pub seed: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
            api_key: None,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ArborError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ArborError> {
        toml::from_str(text)
            .map_err(|e| ArborError::Serialization(format!("Invalid config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, ArborError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ArborError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ArborError::Validation(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArborError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `ARBOR_*` variables from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ARBOR_*` overrides from any lookup. Unparseable numbers are
    /// logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("ARBOR_HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("ARBOR_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid ARBOR_PORT"),
            }
        }
        if let Some(rate) = lookup("ARBOR_RATE_LIMIT") {
            match rate.parse() {
                Ok(r) => self.rate_limit = r,
                Err(_) => tracing::warn!(value = %rate, "Ignoring invalid ARBOR_RATE_LIMIT"),
            }
        }
        if let Some(origins) = lookup("ARBOR_CORS_ORIGINS") {
            self.cors_origins = Some(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        if let Some(key) = lookup("ARBOR_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(seed) = lookup("ARBOR_SEED").filter(|s| !s.is_empty()) {
            self.seed = Some(PathBuf::from(seed));
        }
        self
    }

    /// The configured key, if authentication is enabled.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_local_and_open() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.rate_limit, 100);
        assert!(config.api_key().is_none());
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let text = "port = 9000\napi_key = \"secret\"\n";
        let config = ServerConfig::from_toml_str(text).expect("parse");
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.api_key(), Some("secret"));
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("prot = 9000"),
            Err(ArborError::Serialization(_))
        ));
    }

    #[test]
    fn env_beats_file() {
        let file = ServerConfig::from_toml_str("port = 9000\nrate_limit = 5").expect("parse");
        let config = file.with_overrides(lookup(&[
            ("ARBOR_PORT", "9100"),
            ("ARBOR_CORS_ORIGINS", "http://a.dev, http://b.dev"),
            ("ARBOR_SEED", "seed.json"),
        ]));
        assert_eq!(config.port, 9100);
        assert_eq!(config.rate_limit, 5);
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://a.dev".to_string(), "http://b.dev".to_string()])
        );
        assert_eq!(config.seed, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn invalid_env_numbers_are_ignored() {
        let env = lookup(&[("ARBOR_PORT", "http"), ("ARBOR_RATE_LIMIT", "-1")]);
        let config = ServerConfig::default().with_overrides(env);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn empty_api_key_disables_auth() {
        let config = ServerConfig::default().with_overrides(lookup(&[("ARBOR_API_KEY", "")]));
        assert!(config.api_key().is_none());
    }

    #[test]
    fn reads_config_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "host = \"0.0.0.0\"\nport = 7000").expect("write");

        let config = ServerConfig::from_file(file.path()).expect("load");
        assert_eq!(config.addr(), "0.0.0.0:7000");

        let missing = file.path().with_extension("missing");
        assert!(matches!(ServerConfig::from_file(&missing), Err(ArborError::Io(_))));
    }
}
