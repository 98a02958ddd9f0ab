//! Workers for the name enrichment pipeline.
//!
//! - Enrichment (concurrent age/gender/nationality lookups per record)
//! - Pipeline (Redpanda → enrichment → PostgreSQL)
//! - Mirror (PostgreSQL → cache)
//! - Scheduler (runs the pipeline and the periodic mirror)

pub mod enrichment;
pub mod mirror;
pub mod pipeline;
pub mod scheduler;

pub use enrichment::{Enricher, RecordEnricher};
pub use mirror::*;
pub use pipeline::*;
pub use scheduler::*;
