//! Session handler: per-connection protocol state machine.
//!
//! ARCHITECTURE
//! ============
//! One `Session` exists per WebSocket connection and is owned by that
//! connection's task, so no locking is needed around its own state. It turns
//! typed [`Intent`]s into room membership changes, broadcasts, and
//! fire-and-forget history saves.
//!
//! ```text
//! Connected --joinRoom--> InRoom(boards) --leaveRoom (last)--> Connected
//!     |                        |
//!     +------- disconnect -----+--> Disconnected (terminal)
//! ```
//!
//! The relay forwards the history it receives without inspecting or merging
//! it. The sender is a room member like any other and receives its own
//! broadcast.

use std::sync::Arc;

use history::{BoardId, History, Intent, RelayEvent, SyncKind};
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::persistence::HistoryWriter;
use crate::services::room::{Outbox, RoomRegistry};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Connected,
    /// Boards joined, in join order.
    InRoom(Vec<BoardId>),
    Disconnected,
}

/// What a handled intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Joined { members: usize },
    Left { was_member: bool },
    Relayed { kind: SyncKind, delivered: usize, persisted: bool },
    /// Session already disconnected.
    Ignored,
}

pub struct Session {
    id: Uuid,
    outbox: Outbox,
    rooms: Arc<RoomRegistry>,
    writer: HistoryWriter,
    joined: Vec<BoardId>,
    disconnected: bool,
}

impl Session {
    #[must_use]
    pub fn new(state: &AppState, outbox: Outbox) -> Self {
        Self::with_id(state, Uuid::new_v4(), outbox)
    }

    #[must_use]
    pub fn with_id(state: &AppState, id: Uuid, outbox: Outbox) -> Self {
        Self {
            id,
            outbox,
            rooms: Arc::clone(&state.rooms),
            writer: state.writer.clone(),
            joined: Vec::new(),
            disconnected: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.disconnected {
            Phase::Disconnected
        } else if self.joined.is_empty() {
            Phase::Connected
        } else {
            Phase::InRoom(self.joined.clone())
        }
    }

    /// Dispatch one inbound intent.
    pub async fn handle(&mut self, intent: Intent) -> Handled {
        if self.disconnected {
            debug!(session_id = %self.id, intent = intent.name(), "intent after disconnect ignored");
            return Handled::Ignored;
        }

        match intent {
            Intent::JoinRoom(board_id) => self.join(board_id).await,
            Intent::LeaveRoom(board_id) => self.leave(&board_id).await,
            Intent::Drawing(board_id, history) => self.relay(SyncKind::Drawing, board_id, history).await,
            Intent::Undo(board_id, history) => self.relay(SyncKind::Undo, board_id, history).await,
            Intent::Redo(board_id, history) => self.relay(SyncKind::Redo, board_id, history).await,
        }
    }

    /// Register with the board's room. Does not fetch or push history.
    pub async fn join(&mut self, board_id: BoardId) -> Handled {
        let members = self
            .rooms
            .join(&board_id, self.id, self.outbox.clone())
            .await;
        if !self.joined.contains(&board_id) {
            self.joined.push(board_id);
        }
        Handled::Joined { members }
    }

    pub async fn leave(&mut self, board_id: &BoardId) -> Handled {
        let was_member = self.rooms.leave(board_id, self.id).await;
        self.joined.retain(|joined| joined != board_id);
        Handled::Left { was_member }
    }

    /// Broadcast `history` unchanged to the room. `drawing` is also queued
    /// for persistence; `undo` and `redo` are broadcast-only.
    pub async fn relay(&mut self, kind: SyncKind, board_id: BoardId, history: History) -> Handled {
        let persisted = kind.persists() && self.writer.enqueue(&board_id, &history);

        let events = history.len();
        let event = RelayEvent::sync(kind, board_id.clone(), history);
        let delivered = self.rooms.broadcast(&board_id, &event).await;

        debug!(session_id = %self.id, %board_id, kind = kind.as_str(), events, delivered, "history relayed");
        Handled::Relayed { kind, delivered, persisted }
    }

    /// Leave every joined room. Further intents are ignored.
    pub async fn disconnect(&mut self) {
        if self.disconnected {
            return;
        }
        for board_id in std::mem::take(&mut self.joined) {
            self.rooms.leave(&board_id, self.id).await;
        }
        self.disconnected = true;
        info!(session_id = %self.id, "session disconnected");
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
