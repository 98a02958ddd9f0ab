//! Telemetry for the name enrichment pipeline.
//!
//! Structured logging via `tracing`, in-process counters, and the health
//! registry read by the health server.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
