//! Persistence adapters: PostgreSQL via SeaORM, plus in-memory repositories
//! used as the no-database fallback and as test doubles.

mod connections;
pub mod entity;
pub mod memory;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::{InMemoryAccountRepository, InMemoryPostRepository};
pub use postgres_repo::{PostgresAccountRepository, PostgresPostRepository};
