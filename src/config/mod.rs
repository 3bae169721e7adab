use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Endpoint of the remote token validation capability
    pub validator_url: String,
    pub validator_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub table_name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
}

impl AuthConfig {
    pub fn validator_timeout(&self) -> Duration {
        Duration::from_millis(self.validator_timeout_ms)
    }
}

impl StorageConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PROGRESS_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PROGRESS_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_VALIDATOR_URL") {
            self.auth.validator_url = v;
        }
        if let Ok(v) = env::var("AUTH_VALIDATOR_TIMEOUT_MS") {
            self.auth.validator_timeout_ms = v.parse().unwrap_or(self.auth.validator_timeout_ms);
        }

        // Storage overrides
        match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => self.storage.backend = StorageBackend::Memory,
            Ok("postgres") => self.storage.backend = StorageBackend::Postgres,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.storage.database_url = Some(v);
        }
        if let Ok(v) = env::var("PROGRESS_TABLE") {
            self.storage.table_name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.max_connections = v.parse().unwrap_or(self.storage.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.storage.acquire_timeout_secs = v.parse().unwrap_or(self.storage.acquire_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Check the settings that cannot be defaulted. Called once at startup so a
    /// misconfigured process fails before it binds a port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.validator_url.is_empty() {
            return Err(ConfigError::Missing("AUTH_VALIDATOR_URL"));
        }
        url::Url::parse(&self.auth.validator_url).map_err(|_| ConfigError::InvalidUrl {
            name: "AUTH_VALIDATOR_URL",
            value: self.auth.validator_url.clone(),
        })?;

        if self.storage.backend == StorageBackend::Postgres {
            let database_url = self
                .storage
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            url::Url::parse(database_url).map_err(|_| ConfigError::InvalidUrl {
                name: "DATABASE_URL",
                value: database_url.to_string(),
            })?;
        }

        if !is_valid_table_name(&self.storage.table_name) {
            return Err(ConfigError::InvalidTableName(self.storage.table_name.clone()));
        }

        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            auth: AuthConfig {
                validator_url: "http://localhost:4000/validate".to_string(),
                validator_timeout_ms: 5_000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: None,
                table_name: "academic_progress".to_string(),
                max_connections: 5,
                acquire_timeout_secs: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 64 * 1024,
            },
            auth: AuthConfig {
                validator_url: String::new(),
                validator_timeout_ms: 3_000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                database_url: None,
                table_name: "academic_progress".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 16 * 1024,
            },
            auth: AuthConfig {
                validator_url: String::new(),
                validator_timeout_ms: 2_000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                database_url: None,
                table_name: "academic_progress".to_string(),
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config_requires_urls() {
        let config = AppConfig::production();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(matches!(config.validate(), Err(ConfigError::Missing("AUTH_VALIDATOR_URL"))));

        let mut config = config;
        config.auth.validator_url = "https://auth.example.com/validate".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.storage.database_url = Some("postgres://user:pass@db:5432/progress".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unsafe_table_names() {
        assert!(is_valid_table_name("academic_progress"));
        assert!(is_valid_table_name("_progress2"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("2progress"));
        assert!(!is_valid_table_name("progress; DROP TABLE x"));

        let mut config = AppConfig::development();
        config.storage.table_name = "bad-name".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTableName(_))));
    }
}
