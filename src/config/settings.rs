//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT verification settings
    pub jwt: JwtSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Direct message limits and paging defaults
    pub chat: ChatSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// JWT verification configuration.
///
/// Tokens are issued by the account service; this server only verifies them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared HMAC secret
    pub secret: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 512KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 64KB)
    pub max_frame_size: usize,

    /// Capacity of each connection's outbound queue (default: 256)
    pub send_buffer_size: usize,

    /// Interval between server pings in seconds (default: 54)
    pub heartbeat_interval_secs: u64,

    /// A connection silent for this long is dropped (default: 60)
    pub read_timeout_secs: u64,

    /// Upper bound for a single frame write (default: 10)
    pub write_timeout_secs: u64,
}

/// Direct message configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Maximum message length in characters (default: 4000)
    pub max_content_length: usize,

    /// Page size used when the requested one is out of range (default: 50)
    pub default_page_size: u32,

    /// Largest accepted page size (default: 100)
    pub max_page_size: u32,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the loaded values are inconsistent (see [`Settings::validate`]).
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let settings: Self = Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("websocket.max_message_size", 524288_i64)? // 512KB
            .set_default("websocket.max_frame_size", 65536_i64)? // 64KB
            .set_default("websocket.send_buffer_size", 256_i64)?
            .set_default("websocket.heartbeat_interval_secs", 54_i64)?
            .set_default("websocket.read_timeout_secs", 60_i64)?
            .set_default("websocket.write_timeout_secs", 10_i64)?
            .set_default("chat.max_content_length", 4000_i64)?
            .set_default("chat.default_page_size", 50_i64)?
            .set_default("chat.max_page_size", 100_i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }

        if self.websocket.read_timeout_secs <= self.websocket.heartbeat_interval_secs {
            return Err(ConfigError::Message(format!(
                "websocket.read_timeout_secs ({}) must be greater than websocket.heartbeat_interval_secs ({})",
                self.websocket.read_timeout_secs, self.websocket.heartbeat_interval_secs
            )));
        }

        if self.websocket.send_buffer_size == 0 {
            return Err(ConfigError::Message(
                "websocket.send_buffer_size must be at least 1".into(),
            ));
        }

        if self.chat.default_page_size == 0 || self.chat.default_page_size > self.chat.max_page_size {
            return Err(ConfigError::Message(format!(
                "chat.default_page_size ({}) must be within 1..={}",
                self.chat.default_page_size, self.chat.max_page_size
            )));
        }

        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl WebSocketSettings {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            max_message_size: 512 * 1024,
            max_frame_size: 64 * 1024,
            send_buffer_size: 256,
            heartbeat_interval_secs: 54,
            read_timeout_secs: 60,
            write_timeout_secs: 10,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_content_length: 4000,
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}
