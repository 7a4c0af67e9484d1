//! Room registry: which sessions are viewing which board.
//!
//! DESIGN
//! ======
//! One registry is built at startup and shared through `AppState`. The map
//! lock is held only to look up, insert, or remove a room. Membership
//! changes and fan-out happen under that room's own mutex, so broadcasts to
//! one board are serialized while different boards proceed in parallel.
//!
//! A room is created on first join and removed the moment its last member
//! leaves. A removed room is marked closed so a join that raced the removal
//! retries against a fresh entry instead of joining an orphan.
//!
//! LOCK ORDER
//! ==========
//! `rooms` (write) before `Room::inner`. Paths that only hold one of the two
//! may take it in any order.

use std::collections::HashMap;
use std::sync::Arc;

use history::{BoardId, History, RelayEvent};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

/// Outbound queue owned by one session. Never blocks the broadcaster.
pub type Outbox = mpsc::UnboundedSender<RelayEvent>;

// =============================================================================
// ROOM
// =============================================================================

#[derive(Default)]
struct RoomInner {
    members: HashMap<Uuid, Outbox>,
    /// History carried by the most recent sync broadcast.
    last_snapshot: Option<History>,
    closed: bool,
}

#[derive(Default)]
struct Room {
    inner: Mutex<RoomInner>,
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<BoardId, Arc<Room>>>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session_id` to the board's room, creating the room if needed.
    ///
    /// Idempotent: a repeated join keeps the outbox registered first.
    /// Returns the member count after the join.
    pub async fn join(&self, board_id: &BoardId, session_id: Uuid, outbox: Outbox) -> usize {
        loop {
            let room = {
                let mut rooms = self.rooms.write().await;
                Arc::clone(rooms.entry(board_id.clone()).or_default())
            };

            let mut inner = room.inner.lock().await;
            if inner.closed {
                // EDGE: last member left between map lookup and room lock.
                continue;
            }

            inner.members.entry(session_id).or_insert(outbox);
            let members = inner.members.len();
            info!(%board_id, %session_id, members, "session joined room");
            return members;
        }
    }

    /// Remove `session_id` from the board's room. Empty rooms are discarded.
    ///
    /// Returns `true` if the session was a member.
    pub async fn leave(&self, board_id: &BoardId, session_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(board_id).map(Arc::clone) else {
            return false;
        };

        let mut inner = room.inner.lock().await;
        let was_member = inner.members.remove(&session_id).is_some();
        let remaining = inner.members.len();

        if remaining == 0 {
            inner.closed = true;
            rooms.remove(board_id);
            info!(%board_id, "room discarded");
        } else if was_member {
            info!(%board_id, %session_id, remaining, "session left room");
        }

        was_member
    }

    /// Deliver `event` to every current member of the board's room,
    /// including the sender. Unknown rooms are a no-op.
    ///
    /// Returns the number of members the event reached.
    pub async fn broadcast(&self, board_id: &BoardId, event: &RelayEvent) -> usize {
        let Some(room) = self.room(board_id).await else {
            debug!(%board_id, event = event.name(), "broadcast to empty room dropped");
            return 0;
        };

        let mut inner = room.inner.lock().await;
        if let Some(history) = event.history() {
            inner.last_snapshot = Some(history.clone());
        }

        let mut delivered = 0;
        for (session_id, outbox) in &inner.members {
            // A closed outbox belongs to a session mid-disconnect.
            if outbox.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(%board_id, %session_id, "member outbox closed; skipping");
            }
        }
        delivered
    }

    /// Session ids currently in the board's room.
    pub async fn members(&self, board_id: &BoardId) -> Vec<Uuid> {
        let Some(room) = self.room(board_id).await else {
            return Vec::new();
        };
        room.inner.lock().await.members.keys().copied().collect()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// History from the most recent sync broadcast to this room, if any.
    pub async fn last_snapshot(&self, board_id: &BoardId) -> Option<History> {
        let room = self.room(board_id).await?;
        room.inner.lock().await.last_snapshot.clone()
    }

    /// Drop every room and member handle. Used at shutdown.
    pub async fn clear(&self) {
        let mut rooms = self.rooms.write().await;
        for room in rooms.values() {
            let mut inner = room.inner.lock().await;
            inner.members.clear();
            inner.closed = true;
        }
        let count = rooms.len();
        rooms.clear();
        info!(rooms = count, "room registry cleared");
    }

    async fn room(&self, board_id: &BoardId) -> Option<Arc<Room>> {
        self.rooms.read().await.get(board_id).map(Arc::clone)
    }
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
