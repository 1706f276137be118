//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use yatube_infra::database::DatabaseConfig;
use yatube_infra::{JwtConfig, RateLimitConfig};

/// Seconds a rendered home feed stays cached.
const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 20;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Redis page cache; the in-process cache is used when unset.
    pub redis_url: Option<String>,
    pub page_cache_ttl: Duration,
    /// Directory uploaded images are written to.
    pub media_root: PathBuf,
    pub jwt: JwtConfig,
    pub login_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            page_cache_ttl: Duration::from_secs(
                parse_var("PAGE_CACHE_TTL_SECS").unwrap_or(DEFAULT_PAGE_CACHE_TTL_SECS),
            ),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            jwt: JwtConfig::from_env(),
            login_rate_limit: RateLimitConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
