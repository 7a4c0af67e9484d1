//! WebSocket handler: bidirectional intent/event relay.
//!
//! DESIGN
//! ======
//! On upgrade, creates a [`Session`] with its own outbox and enters a
//! `select!` loop:
//! - Incoming client text frames → parse `Intent` → session handler
//! - Relay events queued on the outbox by any room broadcast → forward to client
//!
//! The session never writes to the socket. Everything the client sees, its
//! own echo included, arrives through the outbox, which keeps per-room
//! broadcast order intact on every connection.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `connected` with the session id
//! 2. Client sends intents → session joins/leaves rooms or relays history
//! 3. Malformed frames → `error` event to this client only; socket stays open
//! 4. Close or transport error → session leaves every room

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use history::{Intent, RelayEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::frame::error_frame;
use crate::services::session::Session;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let (outbox, mut inbox) = mpsc::unbounded_channel::<RelayEvent>();
    let mut session = Session::new(&state, outbox);
    let session_id = session.id();

    if send_event(&mut socket, &RelayEvent::Connected { session_id })
        .await
        .is_err()
    {
        session.disconnect().await;
        return;
    }

    info!(%session_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&mut session, text.as_str()).await;
                        if send_events(&mut socket, &replies).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    Message::Binary(_) => debug!(%session_id, "ws: binary frame ignored"),
                    _ => {}
                }
            }
            Some(event) = inbox.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    debug!(%session_id, phase = ?session.phase(), "ws: closing session");
    session.disconnect().await;
    info!(%session_id, "ws: client disconnected");
}

/// Parse and process one inbound text frame and return events for the sender.
///
/// Keeps transport concerns out of intent handling so tests can drive a
/// session without a socket.
pub(crate) async fn process_inbound_text(session: &mut Session, text: &str) -> Vec<RelayEvent> {
    let intent = match Intent::decode(text) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(session_id = %session.id(), error = %e, "ws: invalid inbound frame");
            return vec![error_frame(&e)];
        }
    };

    debug!(session_id = %session.id(), event = intent.name(), board_id = %intent.board_id(), "ws: recv intent");
    let handled = session.handle(intent).await;
    debug!(session_id = %session.id(), ?handled, "ws: intent handled");
    Vec::new()
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_events(socket: &mut WebSocket, events: &[RelayEvent]) -> Result<(), ()> {
    for event in events {
        send_event(socket, event).await?;
    }
    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: &RelayEvent) -> Result<(), ()> {
    let json = match event.encode() {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, event = event.name(), "ws: failed to serialize event");
            return Err(());
        }
    };
    if let RelayEvent::Error { code, message, .. } = event {
        warn!(code = code.as_str(), message = message.as_str(), "ws: send error event");
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
