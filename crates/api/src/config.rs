//! Server configuration.
//!
//! Sources, later ones winning: `config/default.toml`, optional
//! `config/local.toml`, then `FF__SECTION__KEY` environment variables.

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub jwt: JwtAuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Public URL of the web app. Invitation links point here.
    pub app_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            app_base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "DatabaseConfig::default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "DatabaseConfig::default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        20
    }
    fn default_min_connections() -> u32 {
        5
    }
    fn default_connect_timeout() -> u64 {
        10
    }
    fn default_idle_timeout() -> u64 {
        600
    }
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA private key, PEM.
    pub private_key: String,
    /// RSA public key, PEM.
    pub public_key: String,
    #[serde(default = "JwtAuthConfig::default_expiry")]
    pub access_token_expiry_secs: i64,
    #[serde(default = "JwtAuthConfig::default_leeway")]
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthConfig")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &"[REDACTED]")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtAuthConfig {
    fn default_expiry() -> i64 {
        3600
    }
    fn default_leeway() -> u64 {
        30
    }

    /// Keys from env files arrive quoted and with literal `\n` sequences.
    pub fn normalized_keys(&self) -> (String, String) {
        (unescape_pem(&self.private_key), unescape_pem(&self.public_key))
    }
}

fn unescape_pem(key: &str) -> String {
    key.trim_matches(|c| c == '"' || c == '\'').replace("\\n", "\n")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FF").separator("__"))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// Minimal in-memory config with the given overrides applied.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let base = r#"
            [database]
            url = ""

            [jwt]
            private_key = "test-private-key"
            public_key = "test-public-key"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(base, config::FileFormat::Toml));
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigValidationError::Missing("FF__DATABASE__URL"));
        }
        if self.jwt.private_key.trim().is_empty() {
            return Err(ConfigValidationError::Missing("FF__JWT__PRIVATE_KEY"));
        }
        if self.jwt.public_key.trim().is_empty() {
            return Err(ConfigValidationError::Missing("FF__JWT__PUBLIC_KEY"));
        }
        if self.server.port == 0 {
            return Err(ConfigValidationError::Invalid("server.port must not be 0".into()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::Invalid(
                "database.min_connections exceeds database.max_connections".into(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
