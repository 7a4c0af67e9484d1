//! Board REST routes.
//!
//! Clients hydrate from `GET /api/whiteboard/{id}` before joining a room.
//! `PUT` overwrites the stored history exactly like a relayed `drawing` does,
//! but synchronously.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use history::{BoardId, History};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::frame::ErrorCode;
use crate::services::board::{Board, BoardError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryBody {
    #[serde(default)]
    pub data: History,
}

/// Live view of one room. Not persisted.
#[derive(Debug, Serialize)]
pub struct RoomView {
    pub board_id: BoardId,
    pub members: Vec<Uuid>,
    pub last_snapshot: Option<History>,
}

pub(crate) fn board_error_to_status(err: BoardError) -> StatusCode {
    match err {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::Storage(ref e) => {
            error!(error = %e, code = err.error_code(), "board storage error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/whiteboard`: list boards, newest first.
pub async fn list_boards(State(state): State<AppState>) -> Result<Json<Vec<Board>>, StatusCode> {
    let boards = state
        .store
        .list_boards()
        .await
        .map_err(board_error_to_status)?;
    Ok(Json(boards))
}

/// `POST /api/whiteboard`: create a board, optionally seeded with history.
pub async fn create_board(
    State(state): State<AppState>,
    body: Option<Json<HistoryBody>>,
) -> Result<(StatusCode, Json<Board>), StatusCode> {
    let history = body.map(|Json(body)| body.data).unwrap_or_default();
    let board = state
        .store
        .create_board(history)
        .await
        .map_err(board_error_to_status)?;
    info!(board_id = %board.id, "board created");
    Ok((StatusCode::CREATED, Json(board)))
}

/// `GET /api/whiteboard/{id}`
pub async fn get_board(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Board>, StatusCode> {
    let board = state
        .store
        .fetch_board(&BoardId::from(id))
        .await
        .map_err(board_error_to_status)?;
    Ok(Json(board))
}

/// `PUT /api/whiteboard/{id}`: overwrite the stored history.
pub async fn put_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<HistoryBody>,
) -> Result<Json<Board>, StatusCode> {
    let board = state
        .store
        .save_board(&BoardId::from(id), &body.data)
        .await
        .map_err(board_error_to_status)?;
    Ok(Json(board))
}

/// `GET /api/whiteboard/{id}/room`: current members and last broadcast history.
///
/// An inactive board reports no members rather than 404; rooms exist only
/// while someone is connected.
pub async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> Json<RoomView> {
    let board_id = BoardId::from(id);
    let members = state.rooms.members(&board_id).await;
    let last_snapshot = state.rooms.last_snapshot(&board_id).await;
    Json(RoomView { board_id, members, last_snapshot })
}

#[cfg(test)]
#[path = "boards_test.rs"]
mod tests;
