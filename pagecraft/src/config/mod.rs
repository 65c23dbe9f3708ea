//! Configuration management for pagecraft
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `PAGECRAFT_` prefix, `__` for nesting)
//! 2. `./pagecraft.toml` (development)
//! 3. `~/.config/pagecraft/config.toml` (user config, XDG)
//! 4. `/etc/pagecraft/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # pagecraft.toml
//! [api]
//! base_url = "https://templates.example.com/api"
//! request_timeout_secs = 30
//! refresh_leeway_secs = 30
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [session]
//! store = "file"
//!
//! [uploads]
//! max_size_bytes = 10485760
//! allowed_extensions = ["jpg", "jpeg", "png", "gif", "svg", "pdf"]
//! ```
//!
//! Environment overrides use the same shape:
//! `PAGECRAFT_API__BASE_URL=http://localhost:8000/api`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application name used for config and data directories
pub const APP_NAME: &str = "pagecraft";

/// Default maximum upload size (10 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Defaults could not be serialized as the base layer
    #[error("failed to serialize default configuration: {0}")]
    Defaults(#[from] toml::ser::Error),

    /// A provider failed or a value had the wrong shape
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The configured socket address does not parse
    #[error("invalid server address {0}")]
    Address(String),

    /// The selected token store was not compiled in
    #[error("token store `{0}` needs the `{0}` feature")]
    StoreUnavailable(&'static str),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL all resource paths are resolved against
    pub base_url: String,

    /// Transport timeout applied to every request
    pub request_timeout_secs: u64,

    /// Refresh the access token when it expires within this many seconds
    pub refresh_leeway_secs: i64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            refresh_leeway_secs: 30,
        }
    }
}

impl ApiSettings {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Console server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    /// Parse host and port into a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Address(format!("{}:{}", self.host, self.port)))
    }
}

/// Where the token pair is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// JSON file in the user data directory
    #[default]
    File,
    /// Process memory only; nothing survives a restart
    Memory,
    /// Redis key (requires the `redis` feature)
    Redis,
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Persistence backend
    pub store: TokenStoreKind,

    /// Override for the token file location
    pub file_path: Option<PathBuf>,

    /// Redis connection URL
    pub redis_url: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            store: TokenStoreKind::File,
            file_path: None,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl SessionSettings {
    /// Resolved location of the token file
    ///
    /// Falls back to `./.pagecraft/session.json` when the platform has no
    /// data directory.
    #[must_use]
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir().map_or_else(
                || PathBuf::from(".pagecraft").join("session.json"),
                |dir| dir.join(APP_NAME).join("session.json"),
            )
        })
    }
}

/// Client-side upload checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Largest file accepted before any network call
    pub max_size_bytes: u64,

    /// Accepted file extensions, lowercase without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "svg", "pdf"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Complete pagecraft configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PagecraftConfig {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Console server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Upload checks
    #[serde(default)]
    pub uploads: UploadSettings,
}

impl PagecraftConfig {
    /// Load configuration from the standard locations
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pagecraft::config::PagecraftConfig;
    ///
    /// # fn example() -> Result<(), pagecraft::config::ConfigError> {
    /// let config = PagecraftConfig::load()?;
    /// println!("backend at {}", config.api.base_url);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc").join(APP_NAME).join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./pagecraft.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("PAGECRAFT_").split("__").lowercase(true));

        Ok(figment.extract()?)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults; environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PAGECRAFT_").split("__").lowercase(true))
            .extract()?;
        Ok(config)
    }

    /// The XDG user config path, e.g. `~/.config/pagecraft/config.toml`
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./pagecraft.toml"),
            |config_dir| config_dir.join(APP_NAME).join("config.toml"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PagecraftConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.api.refresh_leeway_secs, 30);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.store, TokenStoreKind::File);
    }

    #[test]
    fn test_upload_defaults() {
        let uploads = UploadSettings::default();
        assert_eq!(uploads.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(
            uploads.allowed_extensions,
            vec!["jpg", "jpeg", "png", "gif", "svg", "pdf"]
        );
    }

    #[test]
    fn test_recommended_path() {
        let path = PagecraftConfig::recommended_path();
        let path = path.to_str().unwrap();
        assert!(path.ends_with(".toml"));
        assert!(path.contains("pagecraft"));
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 8080);

        let bad = ServerSettings {
            host: "not a host".to_string(),
            port: 1,
        };
        assert!(matches!(bad.socket_addr(), Err(ConfigError::Address(_))));
    }

    #[test]
    fn test_explicit_session_file_path_wins() {
        let settings = SessionSettings {
            file_path: Some(PathBuf::from("/tmp/custom.json")),
            ..SessionSettings::default()
        };
        assert_eq!(
            settings.resolved_file_path(),
            PathBuf::from("/tmp/custom.json")
        );
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let config = PagecraftConfig::load_from("/nonexistent/path/pagecraft.toml").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://templates.example.com/api"
refresh_leeway_secs = 5

[session]
store = "memory"

[uploads]
allowed_extensions = ["png"]
"#
        )
        .unwrap();

        let config = PagecraftConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://templates.example.com/api");
        assert_eq!(config.api.refresh_leeway_secs, 5);
        // Unset keys keep their defaults
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.session.store, TokenStoreKind::Memory);
        assert_eq!(config.uploads.allowed_extensions, vec!["png"]);
        assert_eq!(config.uploads.max_size_bytes, DEFAULT_MAX_UPLOAD_SIZE);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a port\"").unwrap();

        let result = PagecraftConfig::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::Extract(_))));
    }
}
