//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `chatmote.toml` in the working directory (or the file named by
//! `CHATMOTE_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use chatmote_app::contexts::ContextOptions;
use chatmote_domain::emoticon::Emoticon;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Cross-context message routing.
    pub router: RouterConfig,
    /// Simulated host page.
    pub simulation: SimulationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `127.0.0.1`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Bound of each context inbox.
    pub channel_capacity: usize,
    /// Give up on a cross-context call after this long. Unset waits forever.
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Nickname the page is logged in as.
    pub nickname: String,
    /// Other viewers posting in the chat.
    pub chatters: Vec<String>,
    /// Mean time between two chatter messages.
    pub chat_interval_ms: u64,
    /// Whether the page tracks its input in `__workingChat`.
    pub working_chat: bool,
    /// Enabled emoticons. Empty uses a built-in demo set.
    pub emoticons: Vec<Emoticon>,
}

impl Config {
    /// Load configuration from `chatmote.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CHATMOTE_CONFIG").unwrap_or_else(|_| "chatmote.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("CHATMOTE_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("CHATMOTE_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        let bind = var("CHATMOTE_BIND");
        if let Some((host, port)) = bind.as_deref().and_then(|val| val.rsplit_once(':')) {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("CHATMOTE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("CHATMOTE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.router.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "router.channel_capacity must be non-zero".to_string(),
            ));
        }
        if self.router.request_timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "router.request_timeout_ms must be non-zero when set".to_string(),
            ));
        }
        if self.simulation.chat_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "simulation.chat_interval_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl RouterConfig {
    #[must_use]
    pub fn options(&self) -> ContextOptions {
        ContextOptions {
            channel_capacity: self.channel_capacity,
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn chat_interval(&self) -> Duration {
        Duration::from_millis(self.chat_interval_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:chatmote.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "chatmoted=info,chatmote=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        let defaults = ContextOptions::default();
        Self {
            channel_capacity: defaults.channel_capacity,
            request_timeout_ms: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nickname: "me".to_string(),
            chatters: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
            chat_interval_ms: 4_000,
            working_chat: true,
            emoticons: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:chatmote.db?mode=rwc");
        assert_eq!(config.router.channel_capacity, 32);
        assert_eq!(config.router.request_timeout_ms, None);
        assert_eq!(config.simulation.nickname, "me");
        assert!(config.simulation.emoticons.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '0.0.0.0'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [router]
            channel_capacity = 4
            request_timeout_ms = 2500

            [simulation]
            nickname = 'streamer_fan'
            chatters = ['dave']
            chat_interval_ms = 1000
            working_chat = false

            [[simulation.emoticons]]
            displayKey = 'grin'
            imageUrl = 'https://cdn/grin.png'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(
            config.router.options(),
            ContextOptions {
                channel_capacity: 4,
                request_timeout: Some(Duration::from_millis(2500)),
            }
        );
        assert_eq!(config.simulation.nickname, "streamer_fan");
        assert_eq!(config.simulation.chatters, vec!["dave".to_string()]);
        assert_eq!(config.simulation.chat_interval(), Duration::from_secs(1));
        assert!(!config.simulation.working_chat);
        assert_eq!(
            config.simulation.emoticons,
            vec![Emoticon::new("grin", "https://cdn/grin.png")]
        );
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.url, "sqlite:chatmote.db?mode=rwc");
        assert!(config.simulation.working_chat);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_override_from_environment() {
        let mut config = Config::default();

        config.apply_overrides(env(&[
            ("CHATMOTE_HOST", "10.0.0.1"),
            ("CHATMOTE_PORT", "4000"),
            ("CHATMOTE_DATABASE_URL", "sqlite::memory:"),
            ("CHATMOTE_LOG", "trace"),
        ]));

        assert_eq!(config.bind_addr(), "10.0.0.1:4000");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_bind_and_rust_log() {
        let mut config = Config::default();

        config.apply_overrides(env(&[
            ("CHATMOTE_PORT", "4000"),
            ("CHATMOTE_BIND", "0.0.0.0:5000"),
            ("CHATMOTE_LOG", "trace"),
            ("RUST_LOG", "warn"),
        ]));

        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_ignore_unparsable_port() {
        let mut config = Config::default();

        config.apply_overrides(env(&[("CHATMOTE_PORT", "http")]));

        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_capacity_and_zero_timeout() {
        let mut config = Config::default();
        config.router.channel_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.router.request_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }
}
