//! Application state - shared across all handlers.

use std::sync::Arc;

use scribe_core::ports::{AccountRepository, PostRepository};
use scribe_infra::database::{
    DatabaseConfig, InMemoryAccountRepository, InMemoryPostRepository, PostgresAccountRepository,
    PostgresPostRepository, connect,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        if let Some(config) = db_config {
            match connect(config).await {
                Ok(conn) => {
                    return Self {
                        accounts: Arc::new(PostgresAccountRepository::new(conn.clone())),
                        posts: Arc::new(PostgresPostRepository::new(conn)),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory()
    }

    /// State backed entirely by in-memory repositories. Nothing survives a
    /// restart; used as the no-database fallback and in tests.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }
}
