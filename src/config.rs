use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub locks: LockConfig,
    pub node: NodeConfig,
    pub push: PushConfig,
    /// Enables dangerous operations like purge and landmark seeding.
    /// Must never be true in production.
    pub test_mode: bool,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Lease put on a held lock so a crashed holder cannot wedge a key forever
    pub lease_seconds: u64,
    /// Redis connection URL. When absent the server falls back to in-process
    /// locks, which is only correct for a single-instance deployment.
    pub redis_url: Option<String>,
    /// How long a toggle request waits for the named lock before failing
    pub wait_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub endpoint: String,
    /// FCM server key. Push delivery is disabled when absent.
    pub server_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub cleanup_interval_seconds: u64,
    pub session_ttl_seconds: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lease_seconds: 30,
            redis_url: None,
            wait_seconds: 5,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
            server_key: None,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 60,
            session_ttl_seconds: 86400, // 24 hours
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let redis_url = std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty());

        let wait_seconds = std::env::var("LOCK_WAIT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let lease_seconds = std::env::var("LOCK_LEASE_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let cleanup_interval_seconds = std::env::var("CLEANUP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let push_endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());
        let push_server_key = std::env::var("FCM_SERVER_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let config = Config {
            locks: LockConfig {
                lease_seconds,
                redis_url,
                wait_seconds,
            },
            node: NodeConfig {
                bind_address,
                data_dir,
            },
            push: PushConfig {
                endpoint: push_endpoint,
                server_key: push_server_key,
            },
            test_mode,
            tokens: TokenConfig {
                cleanup_interval_seconds,
                session_ttl_seconds,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.locks.wait_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "LOCK_WAIT_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.locks.lease_seconds <= self.locks.wait_seconds {
            tracing::warn!(
                "Lock lease ({}s) is not longer than the wait bound ({}s). \
                 A held lock may expire while a second toggle is still waiting.",
                self.locks.lease_seconds,
                self.locks.wait_seconds
            );
        }

        if self.tokens.session_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if the server is running without a distributed lock backend.
    pub fn is_single_node(&self) -> bool {
        self.locks.redis_url.is_none()
    }
}
