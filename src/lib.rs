//! Shared settings for the `name-enricher` and `publish-record` binaries.

pub mod settings;

pub use settings::{load_settings, Settings};
