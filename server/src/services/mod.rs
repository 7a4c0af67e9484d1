//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own room membership, session protocol, and persistence
//! concerns so route handlers can stay focused on protocol translation.

pub mod board;
pub mod memory;
pub mod persistence;
pub mod room;
pub mod session;
