// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use proslide_core::{ProjectGateway, Schema};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Where the project collection lives (JSON file or SQLite).
    pub store: Arc<dyn ProjectGateway>,
    /// Schema used for imports and as the base column set for exports.
    pub schema: Schema,
    /// Backend name reported by `/api/health`.
    pub storage: String,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(store: Arc<dyn ProjectGateway>, storage: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            store,
            schema: Schema::standard(),
            storage: storage.into(),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proslide_core::MemoryGateway;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(Arc::new(MemoryGateway::default()), "memory");
        assert!(state.uptime_secs() < 2);
        assert_eq!(state.schema.len(), 11);
        assert_eq!(state.storage, "memory");
    }
}
