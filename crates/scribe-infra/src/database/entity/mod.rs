//! SeaORM entities and their conversions to/from the domain types.

pub mod account;
pub mod post;
