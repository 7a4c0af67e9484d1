//! Draw events, the atomic unit of board content.
//!
//! DESIGN
//! ======
//! A `DrawEvent` is never removed from a history. Undo flips the `undo` flag
//! on in place and redo clears it, so paint order is stable for the whole
//! life of a board.
//!
//! `points` stays a flat `[x0, y0, x1, y1, ...]` list on the wire because
//! that is what every client renders from directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stroke/fill color used when an event carries none.
pub const DEFAULT_COLOR: &str = "#df4b26";

/// Initial content of a freshly placed text element.
pub const TEXT_PLACEHOLDER: &str = "New Text";

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Opaque id of one draw event. Assigned by the authoring client.
    EventId
);

string_id!(
    /// Board identifier. Doubles as the room name on the relay.
    BoardId
);

impl EventId {
    /// Fresh random id for a new event.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl BoardId {
    /// Fresh random id for a new board.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

// =============================================================================
// TOOL / POINT
// =============================================================================

/// Which kind of element a draw event renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand polyline that grows while the pointer is down.
    #[default]
    Pen,
    /// Single anchored text label.
    Text,
}

impl Tool {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canvas coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// NaN and infinities cannot be rendered or compared.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// =============================================================================
// DRAW EVENT
// =============================================================================

/// One authored stroke or text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawEvent {
    pub id: EventId,
    pub tool: Tool,
    /// Flat coordinate list. Pen: growing polyline. Text: one anchor pair.
    #[serde(default)]
    pub points: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Soft-delete marker. Hidden from rendering when set.
    #[serde(default)]
    pub undo: bool,
}

impl DrawEvent {
    /// Start a pen stroke at `anchor`.
    #[must_use]
    pub fn pen(id: EventId, color: Option<String>, anchor: Point) -> Self {
        Self { id, tool: Tool::Pen, points: vec![anchor.x, anchor.y], text: None, color, undo: false }
    }

    /// Place a text element at `anchor` with the placeholder content.
    #[must_use]
    pub fn text(id: EventId, color: Option<String>, anchor: Point) -> Self {
        Self {
            id,
            tool: Tool::Text,
            points: vec![anchor.x, anchor.y],
            text: Some(TEXT_PLACEHOLDER.to_owned()),
            color,
            undo: false,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.undo
    }

    #[must_use]
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }

    /// First coordinate pair, if the event has one.
    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        match self.points.as_slice() {
            [x, y, ..] => Some(Point::new(*x, *y)),
            _ => None,
        }
    }

    /// Number of complete coordinate pairs.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
