//! Core record types and errors for the name enrichment pipeline.

pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::*;
