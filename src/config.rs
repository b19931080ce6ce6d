/// Configuration management for the Giftpool recorder
use crate::error::{RecorderError, RecorderResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub functions: FunctionsConfig,
    pub badges: BadgeConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

/// Hosted backend function endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsConfig {
    /// Base URL, e.g. https://project.example.co/functions/v1
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Deferred badge trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeConfig {
    pub function_name: String,
    pub delay_ms: u64,
}

/// Upper bound for the badge delay; the wait only covers replication lag
pub const MAX_BADGE_DELAY_MS: u64 = 60_000;

/// Log filter used when `RUST_LOG` is unset or unparseable
pub const DEFAULT_LOG_FILTER: &str = "giftpool_recorder=debug,tower_http=debug";

impl BadgeConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            function_name: "check-badges".to_string(),
            delay_ms: 1000,
        }
    }
}

/// Audit recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Fingerprint stored when the caller sent no User-Agent
    pub fallback_user_agent: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            fallback_user_agent: format!("giftpool-recorder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    /// Build the tracing filter from the configured directives
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> RecorderResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GIFTPOOL_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("GIFTPOOL_PORT")
            .unwrap_or_else(|_| "8787".to_string())
            .parse()
            .map_err(|_| RecorderError::Validation("Invalid port number".to_string()))?;
        let version = env!("CARGO_PKG_VERSION").to_string();

        let database_path = env::var("GIFTPOOL_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/giftpool.sqlite"));
        let max_connections = env::var("GIFTPOOL_DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let base_url = env::var("GIFTPOOL_FUNCTIONS_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:54321/functions/v1".to_string());
        let api_key = env::var("GIFTPOOL_FUNCTIONS_API_KEY").ok();
        let timeout_secs = env::var("GIFTPOOL_FUNCTIONS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let badge_defaults = BadgeConfig::default();
        let function_name =
            env::var("GIFTPOOL_BADGE_FUNCTION").unwrap_or(badge_defaults.function_name);
        let delay_ms = match env::var("GIFTPOOL_BADGE_DELAY_MS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| RecorderError::Validation(format!("Invalid badge delay: {}", raw)))?,
            Err(_) => badge_defaults.delay_ms,
        };

        let fallback_user_agent = env::var("GIFTPOOL_FALLBACK_USER_AGENT")
            .unwrap_or(AuditConfig::default().fallback_user_agent);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                database_path,
                max_connections,
            },
            functions: FunctionsConfig {
                base_url,
                api_key,
                timeout_secs,
            },
            badges: BadgeConfig {
                function_name,
                delay_ms,
            },
            audit: AuditConfig {
                fallback_user_agent,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> RecorderResult<()> {
        if self.service.hostname.is_empty() {
            return Err(RecorderError::Validation("Hostname cannot be empty".to_string()));
        }

        if !self.functions.base_url.starts_with("http://")
            && !self.functions.base_url.starts_with("https://")
        {
            return Err(RecorderError::Validation(format!(
                "Functions URL must be http(s): {}",
                self.functions.base_url
            )));
        }

        if self.badges.function_name.trim().is_empty() {
            return Err(RecorderError::Validation(
                "Badge function name cannot be empty".to_string(),
            ));
        }

        if self.badges.delay_ms > MAX_BADGE_DELAY_MS {
            return Err(RecorderError::Validation(format!(
                "Badge delay must be at most {} ms, got {}",
                MAX_BADGE_DELAY_MS, self.badges.delay_ms
            )));
        }

        if self.storage.max_connections == 0 {
            return Err(RecorderError::Validation(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        Ok(())
    }
}
