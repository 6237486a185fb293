//! SQLite backend for the oprec recruitment store.

pub mod encode;
pub mod error;
pub mod schema;
pub mod seed;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use store::SqliteStore;
