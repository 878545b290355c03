//! Application state - shared across all handlers.

use std::sync::Arc;

#[cfg(feature = "postgres")]
use anyhow::Context;
use inkwell_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, PasswordService, PostRepository,
    TagRepository, TokenService,
};
use inkwell_infra::database::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryStore, InMemoryTagRepository,
};
use inkwell_infra::{Argon2PasswordService, DatabaseConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use inkwell_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use inkwell_infra::database::{
    PostgresAuthorRepository, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresPostRepository, PostgresTagRepository,
};

use crate::config::AppConfig;

/// Where the repositories keep their data.
#[derive(Clone)]
pub enum Storage {
    InMemory,
    #[cfg(feature = "postgres")]
    Postgres(Arc<DatabaseConnections>),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub admin_emails: Arc<Vec<String>>,
    pub storage: Storage,
}

impl AppState {
    /// Build the application state. Without a configured database the
    /// repositories live in memory; a configured database that cannot be
    /// reached or migrated is a startup error.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("No database configured. Running in in-memory mode.");
            return Ok(Self::in_memory(config));
        };

        Self::with_database(config, db_config).await
    }

    #[cfg(feature = "postgres")]
    async fn with_database(
        config: &AppConfig,
        db_config: &DatabaseConfig,
    ) -> anyhow::Result<Self> {
        use migration::MigratorTrait;

        let connections = DatabaseConnections::init(db_config)
            .await
            .context("Failed to connect to the database")?;

        if db_config.run_migrations {
            migration::Migrator::up(connections.main.as_ref(), None)
                .await
                .context("Failed to apply database migrations")?;
            tracing::info!("Database migrations applied");
        }

        tracing::info!("Application state initialized (postgres)");
        Ok(Self::postgres(config, Arc::new(connections)))
    }

    #[cfg(not(feature = "postgres"))]
    async fn with_database(
        config: &AppConfig,
        _db_config: &DatabaseConfig,
    ) -> anyhow::Result<Self> {
        tracing::warn!("Built without the postgres feature; the configured database is ignored");
        Ok(Self::in_memory(config))
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = InMemoryStore::new();

        Self {
            authors: Arc::new(InMemoryAuthorRepository::new(store.clone())),
            categories: Arc::new(InMemoryCategoryRepository::new(store.clone())),
            tags: Arc::new(InMemoryTagRepository::new(store.clone())),
            posts: Arc::new(InMemoryPostRepository::new(store.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(store)),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            admin_emails: Arc::new(config.admin_emails.clone()),
            storage: Storage::InMemory,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(config: &AppConfig, connections: Arc<DatabaseConnections>) -> Self {
        let db = connections.main.clone();

        Self {
            authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            admin_emails: Arc::new(config.admin_emails.clone()),
            storage: Storage::Postgres(connections),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin == email)
    }
}
