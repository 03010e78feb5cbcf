//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `FIXLINE` prefix and nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use fixline::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod push;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use push::PushConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Authentication configuration (JWT secret)
    pub auth: AuthConfig,

    /// Push notification configuration
    pub push: PushConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then environment variables with the
    /// `FIXLINE` prefix and `__` separating nested values:
    ///
    /// - `FIXLINE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FIXLINE__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FIXLINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.push.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize these tests.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("FIXLINE__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var(
            "FIXLINE__AUTH__JWT_SECRET",
            "0123456789abcdef0123456789abcdef",
        );
        env::set_var("FIXLINE__PUSH__ENDPOINT", "https://push.example.com/send");
        env::set_var("FIXLINE__PUSH__API_KEY", "push-key");
    }

    fn clear_env() {
        env::remove_var("FIXLINE__DATABASE__URL");
        env::remove_var("FIXLINE__AUTH__JWT_SECRET");
        env::remove_var("FIXLINE__PUSH__ENDPOINT");
        env::remove_var("FIXLINE__PUSH__API_KEY");
        env::remove_var("FIXLINE__SERVER__PORT");
        env::remove_var("FIXLINE__SERVER__ENVIRONMENT");
        env::remove_var("FIXLINE__PUSH__ONLY_WHEN_OFFLINE");
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(!config.push.only_when_offline);
    }

    #[test]
    fn custom_port_overrides_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FIXLINE__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }

    #[test]
    fn offline_only_push_flag_is_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FIXLINE__PUSH__ONLY_WHEN_OFFLINE", "true");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().push.delivery_policy().push_only_when_offline);
    }
}
