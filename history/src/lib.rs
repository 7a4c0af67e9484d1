//! Shared board history model and realtime wire protocol.
//!
//! This crate owns everything the relay and its clients must agree on: the
//! `DrawEvent` shape, the soft-delete transitions over a board `History`, the
//! JSON events exchanged over the WebSocket, and the client-side
//! `Reconciler` that mirrors the relay's last broadcast.
//!
//! Nothing in here performs I/O. The server and the CLI drive these types
//! from their own transport loops.

pub mod event;
pub mod model;
pub mod reconciler;
pub mod wire;

pub use event::{BoardId, DEFAULT_COLOR, DrawEvent, EventId, Point, TEXT_PLACEHOLDER, Tool};
pub use model::{History, HistoryError};
pub use reconciler::Reconciler;
pub use wire::{Intent, RelayEvent, SyncKind, WireError};
