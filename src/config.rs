//! Loader configuration.
//!
//! Read from a `docmatter.toml` file or constructed directly by the host.
//!
//! # Example
//! ```toml
//! sigil = "dollar"
//! cache_ttl = 60000
//! fetch_timeout = 5000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use educe::Educe;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::Sigil;

/// Default values, kept next to the struct so the serde and `Default`
/// derivations cannot drift apart.
mod defaults {
    use crate::metadata::Sigil;

    pub fn sigil() -> Sigil {
        Sigil::At
    }

    /// Remote content cache validity window, in milliseconds.
    pub fn cache_ttl() -> u64 {
        300_000
    }

    /// Remote fetch timeout, in milliseconds.
    pub fn fetch_timeout() -> u64 {
        10_000
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Canonical sigil applied to linked-data metadata keys.
    #[serde(default = "defaults::sigil")]
    #[educe(Default = defaults::sigil())]
    pub sigil: Sigil,

    /// Remote content cache time-to-live in milliseconds.
    #[serde(default = "defaults::cache_ttl")]
    #[educe(Default = defaults::cache_ttl())]
    pub cache_ttl: u64,

    /// Remote fetch timeout in milliseconds.
    #[serde(default = "defaults::fetch_timeout")]
    #[educe(Default = defaults::fetch_timeout())]
    pub fetch_timeout: u64,
}

impl LoaderConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Ok(toml::from_str(&text)?)
    }

    /// Cache validity window as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl)
    }

    /// Fetch timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.sigil, Sigil::At);
        assert_eq!(config.cache_ttl, 300_000);
        assert_eq!(config.fetch_timeout, 10_000);
        assert_eq!(config.ttl(), Duration::from_secs(300));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: LoaderConfig = toml::from_str("sigil = \"dollar\"").unwrap();
        assert_eq!(config.sigil, Sigil::Dollar);
        assert_eq!(config.cache_ttl, 300_000);
    }

    #[test]
    fn test_full_toml() {
        let config: LoaderConfig = toml::from_str(
            r#"
            sigil = "at"
            cache_ttl = 60000
            fetch_timeout = 5000
        "#,
        )
        .unwrap();
        assert_eq!(config.sigil, Sigil::At);
        assert_eq!(config.cache_ttl, 60_000);
        assert_eq!(config.fetch_timeout, 5_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<LoaderConfig, _> = toml::from_str("cache_tttl = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = LoaderConfig::from_path(Path::new("/nonexistent/docmatter.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_from_path_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmatter.toml");
        fs::write(&path, "sigil = \"dollar\"\nfetch_timeout = 250\n").unwrap();

        let config = LoaderConfig::from_path(&path).unwrap();
        assert_eq!(config.sigil, Sigil::Dollar);
        assert_eq!(config.fetch_timeout, 250);
    }
}
