//! Realtime wire protocol.
//!
//! ARCHITECTURE
//! ============
//! Every WebSocket text message is one JSON object of the form
//! `{"event": <name>, "args": <payload>}`. Events that carry more than one
//! argument use a positional array (`["myBoard", [...history]]`); single
//! argument events carry the bare value (`"myBoard"`).
//!
//! `Intent` flows client → relay. `RelayEvent` flows relay → client. The
//! three sync events (`drawing`, `undo`, `redo`) exist in both directions
//! with identical payloads; the relay forwards the history it received
//! without inspecting it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::BoardId;
use crate::model::History;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three full-history synchronization events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Drawing,
    Undo,
    Redo,
}

impl SyncKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drawing => "drawing",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Only `drawing` is written through to the board store. Undo and redo
    /// are broadcast-only.
    #[must_use]
    pub fn persists(self) -> bool {
        matches!(self, Self::Drawing)
    }
}

// =============================================================================
// CLIENT → RELAY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "camelCase")]
pub enum Intent {
    JoinRoom(BoardId),
    LeaveRoom(BoardId),
    Drawing(BoardId, History),
    Undo(BoardId, History),
    Redo(BoardId, History),
}

impl Intent {
    /// Build the intent for a sync event.
    #[must_use]
    pub fn sync(kind: SyncKind, board_id: BoardId, history: History) -> Self {
        match kind {
            SyncKind::Drawing => Self::Drawing(board_id, history),
            SyncKind::Undo => Self::Undo(board_id, history),
            SyncKind::Redo => Self::Redo(board_id, history),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "joinRoom",
            Self::LeaveRoom(_) => "leaveRoom",
            Self::Drawing(..) => SyncKind::Drawing.as_str(),
            Self::Undo(..) => SyncKind::Undo.as_str(),
            Self::Redo(..) => SyncKind::Redo.as_str(),
        }
    }

    #[must_use]
    pub fn board_id(&self) -> &BoardId {
        match self {
            Self::JoinRoom(board_id)
            | Self::LeaveRoom(board_id)
            | Self::Drawing(board_id, _)
            | Self::Undo(board_id, _)
            | Self::Redo(board_id, _) => board_id,
        }
    }

    /// # Errors
    ///
    /// Returns [`WireError::Json`] if `text` is not a well-formed intent.
    pub fn decode(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns [`WireError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// RELAY → CLIENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "camelCase")]
pub enum RelayEvent {
    /// First event on every connection.
    Connected { session_id: Uuid },
    Drawing(BoardId, History),
    Undo(BoardId, History),
    Redo(BoardId, History),
    /// The relay rejected an inbound message. Sent to the offending client only.
    Error { code: String, message: String, retryable: bool },
}

impl RelayEvent {
    #[must_use]
    pub fn sync(kind: SyncKind, board_id: BoardId, history: History) -> Self {
        match kind {
            SyncKind::Drawing => Self::Drawing(board_id, history),
            SyncKind::Undo => Self::Undo(board_id, history),
            SyncKind::Redo => Self::Redo(board_id, history),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Drawing(..) => SyncKind::Drawing.as_str(),
            Self::Undo(..) => SyncKind::Undo.as_str(),
            Self::Redo(..) => SyncKind::Redo.as_str(),
            Self::Error { .. } => "error",
        }
    }

    #[must_use]
    pub fn board_id(&self) -> Option<&BoardId> {
        match self {
            Self::Drawing(board_id, _) | Self::Undo(board_id, _) | Self::Redo(board_id, _) => Some(board_id),
            Self::Connected { .. } | Self::Error { .. } => None,
        }
    }

    /// The broadcast history, for sync events.
    #[must_use]
    pub fn history(&self) -> Option<&History> {
        match self {
            Self::Drawing(_, history) | Self::Undo(_, history) | Self::Redo(_, history) => Some(history),
            Self::Connected { .. } | Self::Error { .. } => None,
        }
    }

    /// # Errors
    ///
    /// Returns [`WireError::Json`] if `text` is not a well-formed relay event.
    pub fn decode(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns [`WireError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
