//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor and
//! cloned into every WebSocket session. It holds the board store, the room
//! registry, and the enqueue handle of the history writer. Nothing here is
//! global: `main` builds one instance at startup and tears it down at
//! shutdown.

use std::sync::Arc;

use crate::services::board::BoardStore;
use crate::services::persistence::HistoryWriter;
use crate::services::room::RoomRegistry;

/// Clone is required by Axum. All inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BoardStore>,
    pub rooms: Arc<RoomRegistry>,
    pub writer: HistoryWriter,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn BoardStore>, writer: HistoryWriter) -> Self {
        Self { store, rooms: Arc::new(RoomRegistry::new()), writer }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
