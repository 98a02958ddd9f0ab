//! Application state shared across handlers.

use worker::MokaCacheMirror;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Cache filled by the mirror worker
    pub cache: MokaCacheMirror,
}

impl AppState {
    pub fn new(cache: MokaCacheMirror) -> Self {
        Self { cache }
    }
}
