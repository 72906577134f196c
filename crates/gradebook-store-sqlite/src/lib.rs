//! SQLite backend for gradebook persistence.
//!
//! A single `storage` table holds string values by key, giving the session
//! store a durable local key/value area.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
