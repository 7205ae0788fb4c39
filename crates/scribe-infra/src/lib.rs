//! # Scribe Infra
//!
//! Infrastructure adapters: SeaORM persistence, JWT tokens, Argon2 hashing.

pub mod auth;
pub mod database;
