/// Configuration management for social-api
///
/// Loads configuration from environment variables (optionally seeded from
/// a `.env` file by the binary).
use crate::security::jwt::MIN_SECRET_LEN;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    pub http_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Token signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_secs")]
    pub jwt_ttl_secs: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_jwt_ttl_secs() -> i64 {
    3600
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT").unwrap_or(8080),
        };

        let database = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: env_parse("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(default_max_connections),
                min_connections: env_parse("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(default_min_connections),
                connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT_SECS")
                    .unwrap_or_else(default_connect_timeout_secs),
            });

        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }
        let auth = AuthConfig {
            jwt_secret,
            jwt_ttl_secs: env_parse("JWT_TTL_SECS").unwrap_or_else(default_jwt_ttl_secs),
        };

        let logging = LoggingConfig {
            json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        Ok(Config {
            app,
            database,
            auth,
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SECRET: &str = "config-test-secret-0123456789abcdefgh";

    fn clear_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "PORT",
            "DATABASE_URL",
            "DB_MAX_CONNECTIONS",
            "DB_MIN_CONNECTIONS",
            "DB_CONNECT_TIMEOUT_SECS",
            "JWT_SECRET",
            "JWT_TTL_SECS",
            "LOG_FORMAT",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_default_values() {
        clear_env();
        std::env::set_var("JWT_SECRET", SECRET);

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8080);
        assert!(config.database.is_none());
        assert_eq!(config.auth.jwt_ttl_secs, 3600);
        assert!(!config.logging.json);
    }

    #[test]
    #[serial]
    fn test_database_settings() {
        clear_env();
        std::env::set_var("JWT_SECRET", SECRET);
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("DB_MAX_CONNECTIONS", "7");
        std::env::set_var("LOG_FORMAT", "JSON");

        let config = Config::from_env().unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://test");
        assert_eq!(database.max_connections, 7);
        assert_eq!(database.min_connections, 1);
        assert_eq!(database.connect_timeout_secs, 5);
        assert!(config.logging.json);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_secret_required_and_long_enough() {
        clear_env();
        assert!(Config::from_env().is_err());

        std::env::set_var("JWT_SECRET", "too-short");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_secret_redacted_in_debug() {
        clear_env();
        std::env::set_var("JWT_SECRET", SECRET);
        let config = Config::from_env().unwrap();
        assert!(!format!("{:?}", config).contains(SECRET));
        clear_env();
    }
}
