//! Domain entities - the core business objects.

mod account;

mod post;

pub use account::Account;
pub use post::{Category, Post};
