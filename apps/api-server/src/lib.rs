//! # Scribe API Server
//!
//! Actix-web HTTP layer over the Scribe domain: registration, login, profile
//! management, and blog post CRUD.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
