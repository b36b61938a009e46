use std::{env, str::FromStr, time::Duration};

use tracing::warn;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_interval: Duration,
    pub cleanup_interval: Duration,
    pub inactive_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            cleanup_interval: Duration::from_secs(60),
            inactive_timeout: Duration::from_secs(600),
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", name, value);
            default
        }),
        Err(_) => default,
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let tick_millis = env_or(
            "TICK_INTERVAL_MILLIS",
            defaults.tick_interval.as_millis() as u64,
        );
        let cleanup_secs = env_or(
            "CLEANUP_INTERVAL_SECONDS",
            defaults.cleanup_interval.as_secs(),
        );
        let inactive_secs = env_or(
            "INACTIVE_GAME_TIMEOUT_SECONDS",
            defaults.inactive_timeout.as_secs(),
        );

        let allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(origins) => origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        Self {
            tick_interval: Duration::from_millis(tick_millis.max(1)),
            cleanup_interval: Duration::from_secs(cleanup_secs.max(1)),
            inactive_timeout: Duration::from_secs(inactive_secs),
            allowed_origins,
        }
    }
}
