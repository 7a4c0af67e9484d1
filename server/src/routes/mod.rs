//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the board REST endpoints and the realtime websocket
//! endpoint under a single Axum router.

pub mod boards;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/whiteboard", get(boards::list_boards).post(boards::create_board))
        .route("/api/whiteboard/{id}", get(boards::get_board).put(boards::put_board))
        .route("/api/whiteboard/{id}/room", get(boards::get_room))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
