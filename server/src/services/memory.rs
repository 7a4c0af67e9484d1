//! In-process board store used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use history::{BoardId, History};
use tokio::sync::RwLock;

use super::board::{Board, BoardError, BoardStore, now_ms};

#[derive(Default)]
pub struct MemoryBoardStore {
    boards: RwLock<HashMap<BoardId, Board>>,
}

impl MemoryBoardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a board under a caller-chosen id.
    pub async fn seed(&self, id: BoardId, history: History) -> Board {
        let now = now_ms();
        let board = Board { id: id.clone(), history, created_at: now, updated_at: now };
        self.boards.write().await.insert(id, board.clone());
        board
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn create_board(&self, history: History) -> Result<Board, BoardError> {
        let mut boards = self.boards.write().await;
        let mut id = BoardId::generate();
        while boards.contains_key(&id) {
            id = BoardId::generate();
        }
        let now = now_ms();
        let board = Board { id: id.clone(), history, created_at: now, updated_at: now };
        boards.insert(id, board.clone());
        Ok(board)
    }

    async fn fetch_board(&self, id: &BoardId) -> Result<Board, BoardError> {
        self.boards
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    async fn save_board(&self, id: &BoardId, history: &History) -> Result<Board, BoardError> {
        let mut boards = self.boards.write().await;
        let board = boards
            .get_mut(id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;
        board.history = history.clone();
        board.updated_at = now_ms().max(board.updated_at);
        Ok(board.clone())
    }

    async fn list_boards(&self) -> Result<Vec<Board>, BoardError> {
        let mut boards: Vec<Board> = self.boards.read().await.values().cloned().collect();
        boards.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(boards)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
