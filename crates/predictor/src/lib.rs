//! Predictor clients for the name enrichment pipeline.
//!
//! Each provider answers `GET <base>?name=<value>` with its own JSON shape;
//! [`AttributePrediction`] turns that shape into a single value.

pub mod client;
pub mod config;
pub mod prediction;

pub use client::*;
pub use config::*;
pub use prediction::*;
