//! Redpanda consumer and producer for name records.

pub mod config;
pub mod connection;
pub mod consumer;
pub mod health;
pub mod offsets;
pub mod producer;
pub mod reader;
pub mod source;

pub use config::*;
pub use consumer::*;
pub use offsets::*;
pub use producer::*;
pub use source::*;
