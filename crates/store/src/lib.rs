//! PostgreSQL persistence for enriched name records.

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod insert;
pub mod offsets;
pub mod query;
pub mod schema;

pub use client::*;
pub use config::*;
pub use insert::PersistenceSink;
pub use query::{StoredName, StoredNames};
