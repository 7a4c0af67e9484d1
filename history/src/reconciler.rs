//! Client reconciler: the client-side mirror of one board's history.
//!
//! SYSTEM CONTEXT
//! ==============
//! A client applies its own edits optimistically, then sends the resulting
//! full history to the relay. Whatever the relay broadcasts next replaces
//! the local copy wholesale, including echoes of the client's own edits.
//! The reconciler never merges: the last broadcast wins.
//!
//! Each method that changes what peers should see returns the `Intent` the
//! caller must send. The reconciler itself never touches the network.
//!
//! UNDO / REDO
//! ===========
//! `local_history` holds ids this client authored (or most recently redid),
//! `redo_history` holds ids it most recently undid. Both are LIFO stacks and
//! are never shared with other clients. Any new authored edit clears the redo
//! chain.

use crate::event::{BoardId, DrawEvent, EventId, Point, Tool};
use crate::model::{History, HistoryError};
use crate::wire::{Intent, RelayEvent, SyncKind};

#[derive(Debug, Clone)]
pub struct Reconciler {
    board_id: BoardId,
    history: History,
    local_history: Vec<EventId>,
    redo_history: Vec<EventId>,
    /// Pen stroke currently being dragged, if any.
    active_stroke: Option<EventId>,
    tool: Tool,
    color: Option<String>,
}

impl Reconciler {
    #[must_use]
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            history: History::new(),
            local_history: Vec::new(),
            redo_history: Vec::new(),
            active_stroke: None,
            tool: Tool::default(),
            color: None,
        }
    }

    // -------------------------------------------------------------------------
    // accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&DrawEvent> {
        self.history.visible()
    }

    #[must_use]
    pub fn local_history(&self) -> &[EventId] {
        &self.local_history
    }

    #[must_use]
    pub fn redo_history(&self) -> &[EventId] {
        &self.redo_history
    }

    #[must_use]
    pub fn active_stroke(&self) -> Option<&EventId> {
        self.active_stroke.as_ref()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.local_history.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_history.is_empty()
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color;
    }

    // -------------------------------------------------------------------------
    // lifecycle
    // -------------------------------------------------------------------------

    /// Seed from the persisted board. Call once, before joining the room.
    pub fn hydrate(&mut self, history: History) -> Intent {
        self.history = history;
        Intent::JoinRoom(self.board_id.clone())
    }

    /// Reset to an empty board and produce the matching `leaveRoom`.
    pub fn leave(&mut self) -> Intent {
        self.history = History::new();
        self.local_history.clear();
        self.redo_history.clear();
        self.active_stroke = None;
        Intent::LeaveRoom(self.board_id.clone())
    }

    // -------------------------------------------------------------------------
    // authored edits
    // -------------------------------------------------------------------------

    /// Pointer-down (pen) or double-click (text) at `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Malformed`] for a non-finite anchor. Local
    /// state is left untouched in that case.
    pub fn begin_stroke(&mut self, anchor: Point) -> Result<Intent, HistoryError> {
        let (id, next) = self.history.begin_stroke(self.tool, self.color.clone(), anchor)?;
        self.history = next;
        if self.tool == Tool::Pen {
            self.active_stroke = Some(id.clone());
        }
        self.record_edit(id);
        Ok(self.sync(SyncKind::Drawing))
    }

    /// Pointer-move while a pen stroke is active. `None` if no stroke is.
    pub fn extend_stroke(&mut self, point: Point) -> Option<Intent> {
        let id = self.active_stroke.clone()?;
        self.history = self.history.extend_stroke(&id, point);
        self.record_edit(id);
        Some(self.sync(SyncKind::Drawing))
    }

    /// Pointer-up. Ends the active stroke and re-sends the final history.
    pub fn finish_stroke(&mut self) -> Option<Intent> {
        self.active_stroke.take()?;
        Some(self.sync(SyncKind::Drawing))
    }

    /// Edit a text element. `None` if `id` is not a text element here.
    pub fn set_text(&mut self, id: &EventId, text: &str) -> Option<Intent> {
        let is_text = self.history.get(id).is_some_and(|ev| ev.tool == Tool::Text);
        if !is_text {
            return None;
        }
        self.history = self.history.set_text(id, text);
        self.record_edit(id.clone());
        Some(self.sync(SyncKind::Drawing))
    }

    // -------------------------------------------------------------------------
    // undo / redo
    // -------------------------------------------------------------------------

    /// Undo this client's most recent edit. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Intent> {
        let id = self.local_history.pop()?;
        self.history = self.history.mark_undo(&id);
        self.redo_history.push(id);
        Some(self.sync(SyncKind::Undo))
    }

    /// Redo the most recently undone edit. `None` when the redo stack is empty.
    pub fn redo(&mut self) -> Option<Intent> {
        let id = self.redo_history.pop()?;
        self.history = self.history.mark_redo(&id);
        self.local_history.push(id);
        Some(self.sync(SyncKind::Redo))
    }

    // -------------------------------------------------------------------------
    // inbound
    // -------------------------------------------------------------------------

    /// Apply a relay broadcast. Returns `true` if the local history was replaced.
    pub fn apply(&mut self, event: &RelayEvent) -> bool {
        let (Some(board_id), Some(history)) = (event.board_id(), event.history()) else {
            return false;
        };
        if board_id != &self.board_id {
            return false;
        }
        self.history = history.clone();
        true
    }

    // -------------------------------------------------------------------------
    // helpers
    // -------------------------------------------------------------------------

    fn record_edit(&mut self, id: EventId) {
        if !self.local_history.contains(&id) {
            self.local_history.push(id);
        }
        self.redo_history.clear();
    }

    fn sync(&self, kind: SyncKind) -> Intent {
        Intent::sync(kind, self.board_id.clone(), self.history.clone())
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
