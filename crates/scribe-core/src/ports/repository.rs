use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Post};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Account repository with lookups used during registration and login.
#[async_trait]
pub trait AccountRepository: BaseRepository<Account, Uuid> {
    /// Find an account by its unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, RepoError>;

    /// Find an account by its unique email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Check whether `slug` is already taken, optionally excluding one record
    /// (the post being updated).
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    /// All non-draft posts, newest publish date first, with creation time as
    /// the tie-break and never-published rows last.
    async fn list_published(&self) -> Result<Vec<Post>, RepoError>;
}
