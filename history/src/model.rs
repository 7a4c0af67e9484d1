//! Board history: ordered draw events with soft-delete transitions.
//!
//! DESIGN
//! ======
//! Every transition takes `&self` and returns a new `History`. The relay and
//! the clients treat a history as a value that is broadcast wholesale, so no
//! caller ever observes a half-applied edit.
//!
//! ERROR HANDLING
//! ==============
//! A transition that references an unknown id, or carries a non-finite
//! coordinate, returns an unchanged copy. A client holding a stale reference
//! (for example to an event another client just undid) must not break the
//! board for everyone else. Only `begin_stroke` reports malformed input,
//! because it has no event to hand back.

use serde::{Deserialize, Serialize};

use crate::event::{DrawEvent, EventId, Point, Tool};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    #[error("malformed coordinate ({x}, {y})")]
    Malformed { x: f64, y: f64 },
    #[error("duplicate event id: {0}")]
    DuplicateId(EventId),
}

/// Full ordered event list for one board. Insertion order is paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<DrawEvent>);

// =============================================================================
// CONSTRUCTION / ACCESS
// =============================================================================

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_events(events: Vec<DrawEvent>) -> Self {
        Self(events)
    }

    #[must_use]
    pub fn events(&self) -> &[DrawEvent] {
        &self.0
    }

    #[must_use]
    pub fn into_events(self) -> Vec<DrawEvent> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawEvent> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<&DrawEvent> {
        self.0.iter().find(|ev| &ev.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    /// Events that should be painted, in paint order.
    ///
    /// Rendering only. Synchronization always carries the full history.
    #[must_use]
    pub fn visible(&self) -> Vec<&DrawEvent> {
        self.0.iter().filter(|ev| ev.is_visible()).collect()
    }
}

impl FromIterator<DrawEvent> for History {
    fn from_iter<I: IntoIterator<Item = DrawEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a DrawEvent;
    type IntoIter = std::slice::Iter<'a, DrawEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

impl History {
    /// Append a new pen stroke or text element with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Malformed`] if `anchor` is not finite.
    pub fn begin_stroke(
        &self,
        tool: Tool,
        color: Option<String>,
        anchor: Point,
    ) -> Result<(EventId, Self), HistoryError> {
        let id = EventId::generate();
        let next = self.begin_stroke_with_id(id.clone(), tool, color, anchor)?;
        Ok((id, next))
    }

    /// Same as [`History::begin_stroke`] with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Malformed`] if `anchor` is not finite, or
    /// [`HistoryError::DuplicateId`] if `id` is already in the history.
    pub fn begin_stroke_with_id(
        &self,
        id: EventId,
        tool: Tool,
        color: Option<String>,
        anchor: Point,
    ) -> Result<Self, HistoryError> {
        if !anchor.is_finite() {
            return Err(HistoryError::Malformed { x: anchor.x, y: anchor.y });
        }
        if self.contains(&id) {
            return Err(HistoryError::DuplicateId(id));
        }

        let event = match tool {
            Tool::Pen => DrawEvent::pen(id, color, anchor),
            Tool::Text => DrawEvent::text(id, color, anchor),
        };
        let mut next = self.clone();
        next.0.push(event);
        Ok(next)
    }

    /// Append a coordinate pair to a pen stroke.
    #[must_use]
    pub fn extend_stroke(&self, id: &EventId, point: Point) -> Self {
        if !point.is_finite() {
            return self.clone();
        }
        self.update(id, |ev| {
            // Text keeps exactly one anchor.
            if ev.tool == Tool::Pen {
                ev.points.extend([point.x, point.y]);
            }
        })
    }

    /// Replace the content of a text element.
    #[must_use]
    pub fn set_text(&self, id: &EventId, text: &str) -> Self {
        self.update(id, |ev| {
            if ev.tool == Tool::Text {
                ev.text = Some(text.to_owned());
            }
        })
    }

    #[must_use]
    pub fn mark_undo(&self, id: &EventId) -> Self {
        self.update(id, |ev| ev.undo = true)
    }

    #[must_use]
    pub fn mark_redo(&self, id: &EventId) -> Self {
        self.update(id, |ev| ev.undo = false)
    }

    fn update(&self, id: &EventId, apply: impl FnOnce(&mut DrawEvent)) -> Self {
        let mut next = self.clone();
        if let Some(ev) = next.0.iter_mut().find(|ev| &ev.id == id) {
            apply(ev);
        }
        next
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
