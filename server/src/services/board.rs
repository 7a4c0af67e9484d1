//! Board store: where board histories live between sessions.
//!
//! DESIGN
//! ======
//! The relay never merges histories. `save_board` overwrites the stored
//! history in full, so whichever save lands last wins. The relay itself keeps
//! no durable copy of any board.
//!
//! Two implementations sit behind [`BoardStore`]: [`PgBoardStore`] (history
//! stored as one JSONB column per board row) and
//! [`MemoryBoardStore`](super::memory::MemoryBoardStore).
//!
//! ERROR HANDLING
//! ==============
//! `NotFound` surfaces to the caller (HTTP 404, or a logged write miss).
//! `Storage` is transient from the relay's point of view: the writer logs
//! and retries it, the live broadcast path never sees it.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use history::{BoardId, History};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board not found: {0}")]
    NotFound(BoardId),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for BoardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_BOARD_NOT_FOUND",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Persisted board aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub id: BoardId,
    /// Full event history. Named `data` on the HTTP surface.
    #[serde(rename = "data")]
    pub history: History,
    /// Milliseconds since Unix epoch.
    pub created_at: i64,
    /// Milliseconds since Unix epoch.
    pub updated_at: i64,
}

/// Narrow interface the relay and the HTTP surface use for board storage.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Allocate a new board seeded with `history` (usually empty).
    async fn create_board(&self, history: History) -> Result<Board, BoardError>;

    async fn fetch_board(&self, id: &BoardId) -> Result<Board, BoardError>;

    /// Overwrite the stored history. No merge.
    async fn save_board(&self, id: &BoardId, history: &History) -> Result<Board, BoardError>;

    /// All boards, most recently created first.
    async fn list_boards(&self) -> Result<Vec<Board>, BoardError>;
}

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// POSTGRES
// =============================================================================

type BoardRow = (String, Json<History>, i64, i64);

fn row_to_board((id, Json(history), created_at, updated_at): BoardRow) -> Board {
    Board { id: BoardId::from(id), history, created_at, updated_at }
}

pub struct PgBoardStore {
    pool: PgPool,
}

impl PgBoardStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardStore for PgBoardStore {
    async fn create_board(&self, history: History) -> Result<Board, BoardError> {
        let id = BoardId::generate();
        let now = now_ms();
        sqlx::query("INSERT INTO boards (id, history, created_at, updated_at) VALUES ($1, $2, $3, $3)")
            .bind(id.as_str())
            .bind(Json(&history))
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(Board { id, history, created_at: now, updated_at: now })
    }

    async fn fetch_board(&self, id: &BoardId) -> Result<Board, BoardError> {
        let row = sqlx::query_as::<_, BoardRow>("SELECT id, history, created_at, updated_at FROM boards WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_board)
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    async fn save_board(&self, id: &BoardId, history: &History) -> Result<Board, BoardError> {
        let row = sqlx::query_as::<_, BoardRow>(
            "UPDATE boards SET history = $2, updated_at = $3 WHERE id = $1 \
             RETURNING id, history, created_at, updated_at",
        )
        .bind(id.as_str())
        .bind(Json(history))
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_board)
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    async fn list_boards(&self) -> Result<Vec<Board>, BoardError> {
        let rows = sqlx::query_as::<_, BoardRow>(
            "SELECT id, history, created_at, updated_at FROM boards ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_board).collect())
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
