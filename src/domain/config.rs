use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

/// Client configuration.
///
/// Controls where the service lives and how eagerly the dashboard talks to
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the requirements service, without a trailing slash.
    ///
    /// For example, `http://localhost:5000`.
    base_url: String,

    /// Quiet period after the last search or filter edit before a query is
    /// sent, in milliseconds.
    debounce_ms: u64,

    /// Per-request timeout, in seconds.
    timeout_secs: u64,

    /// Page size to request.
    ///
    /// When unset the service's default page size is used.
    pub per_page: Option<u32>,
}

/// Errors raised while reading or writing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration TOML.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The request timeout is zero.
    #[error("timeout_secs must be at least 1")]
    ZeroTimeout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debounce_ms: default_debounce_ms(),
            timeout_secs: default_timeout_secs(),
            per_page: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if it sets a zero timeout.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        if config.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The service base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point the client at a different service.
    ///
    /// Any trailing slash is removed.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    /// The debounce window for search and filter edits.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Set the debounce window.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the per-request timeout, rounded down to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`], leaving the timeout unchanged,
    /// if that rounds to zero.
    pub const fn set_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        if timeout.as_secs() == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout_secs = timeout.as_secs();
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_timeout_secs() -> u64 {
    15
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_base_url")]
        base_url: String,

        #[serde(default = "default_debounce_ms")]
        debounce_ms: u64,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        per_page: Option<u32>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                base_url,
                debounce_ms,
                timeout_secs,
                per_page,
            } => Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                debounce_ms,
                timeout_secs,
                per_page,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            base_url: config.base_url,
            debounce_ms: config.debounce_ms,
            timeout_secs: config.timeout_secs,
            per_page: config.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nbase_url = \"https://reqs.example.com/\"\ndebounce_ms = 250\ntimeout_secs = 3\nper_page = 10\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.base_url(), "https://reqs.example.com");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.per_page, Some(10));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("Failed to access config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndebounce_ms = \"soon\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse config file:"));
    }

    #[test]
    fn load_rejects_zero_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ntimeout_secs = 0\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::ZeroTimeout));
    }

    #[test]
    fn zero_timeout_is_not_set() {
        let mut config = Config::default();

        assert!(config.set_timeout(Duration::from_millis(900)).is_err());
        assert_eq!(config.timeout(), Duration::from_secs(15));

        config.set_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reqdash.toml");
        let mut config = Config::default();
        config.set_base_url("http://10.0.0.7:8080/");
        config.set_debounce(Duration::from_millis(50));

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
