//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, MediaStorage, PasswordService,
    PostRepository, RateLimiter, TokenService, UserRepository,
};
use yatube_infra::database::{DatabaseConnections, InMemoryDatabase};
use yatube_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryMediaStorage, InMemoryRateLimiter, JwtConfig,
    JwtTokenService, LocalMediaStorage, RateLimitConfig,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    /// Rendered page snapshots.
    pub cache: Arc<dyn Cache>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub login_limiter: Arc<dyn RateLimiter>,
    pub page_cache_ttl: Duration,
    pub db: Option<Arc<DatabaseConnections>>,
}

/// The five repositories, all backed by one store.
struct Repositories {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self {
            users: db.clone(),
            groups: db.clone(),
            posts: db.clone(),
            comments: db.clone(),
            follows: db,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(conn: &DatabaseConnections) -> Self {
        use yatube_infra::database::{
            PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
            PostgresPostRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.main.clone())),
            follows: Arc::new(PostgresFollowRepository::new(conn.main.clone())),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// A configured database that cannot be reached or migrated is a
    /// startup failure; no database at all means in-memory storage.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (db, repos) = Self::init_storage(config).await?;
        let cache = Self::init_cache(config).await;

        tracing::info!(
            media_root = %config.media_root.display(),
            page_cache_ttl_secs = config.page_cache_ttl.as_secs(),
            "Application state initialized"
        );

        Ok(Self {
            users: repos.users,
            groups: repos.groups,
            posts: repos.posts,
            comments: repos.comments,
            follows: repos.follows,
            cache,
            media: Arc::new(LocalMediaStorage::new(config.media_root.clone())),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            login_limiter: Arc::new(InMemoryRateLimiter::new(config.login_rate_limit.clone())),
            page_cache_ttl: config.page_cache_ttl,
            db,
        })
    }

    /// Everything in process memory. Used by tests.
    pub fn in_memory(page_cache_ttl: Duration) -> Self {
        let repos = Repositories::in_memory();
        Self {
            users: repos.users,
            groups: repos.groups,
            posts: repos.posts,
            comments: repos.comments,
            follows: repos.follows,
            cache: Arc::new(InMemoryCache::new()),
            media: Arc::new(InMemoryMediaStorage::new()),
            tokens: Arc::new(JwtTokenService::new(JwtConfig::default())),
            passwords: Arc::new(Argon2PasswordService::new()),
            login_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default())),
            page_cache_ttl,
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_storage(
        config: &AppConfig,
    ) -> anyhow::Result<(Option<Arc<DatabaseConnections>>, Repositories)> {
        use anyhow::Context;
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok((None, Repositories::in_memory()));
        };

        let connections = DatabaseConnections::init(db_config)
            .await
            .context("failed to connect to the database")?;
        Migrator::up(&connections.main, None)
            .await
            .context("failed to apply migrations")?;
        tracing::info!("Database migrations applied");

        let repos = Repositories::postgres(&connections);
        Ok((Some(Arc::new(connections)), repos))
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_storage(
        _config: &AppConfig,
    ) -> anyhow::Result<(Option<Arc<DatabaseConnections>>, Repositories)> {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Ok((None, Repositories::in_memory()))
    }

    async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
        #[cfg(feature = "redis")]
        if let Some(url) = &config.redis_url {
            use yatube_infra::{RedisCache, RedisConfig};

            match RedisCache::new(RedisConfig::from_env(url.clone())).await {
                Ok(cache) => return Arc::new(cache),
                Err(e) => {
                    tracing::error!(error = %e, "Redis unavailable. Using in-memory page cache.");
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        if config.redis_url.is_some() {
            tracing::warn!("REDIS_URL set but the redis feature is disabled");
        }

        Arc::new(InMemoryCache::new())
    }
}
