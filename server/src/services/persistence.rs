//! Persistence service: background writer for board histories.
//!
//! DESIGN
//! ======
//! Sessions never await the board store. A `drawing` intent hands its history
//! to [`HistoryWriter::enqueue`], which does a non-blocking `try_send` onto a
//! bounded queue. One worker task drains the queue, keeps only the newest
//! pending history per board, and writes them out on a short ticker. A board
//! that is drawn on faster than the store can absorb gets fewer writes, never
//! a longer queue.
//!
//! Saves are full overwrites, so skipping an intermediate history loses
//! nothing that the next save does not also carry.
//!
//! ERROR HANDLING
//! ==============
//! Retryable store errors are retried with linear back-off up to the
//! configured attempt count, then logged and dropped. Non-retryable errors
//! (unknown board) are logged once. Nothing is reported back to the session.

use std::collections::HashMap;
use std::sync::Arc;

use history::{BoardId, History};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::PersistConfig;
use crate::frame::ErrorCode;
use crate::services::board::BoardStore;

#[derive(Debug)]
struct SaveRequest {
    board_id: BoardId,
    history: History,
}

/// Cloneable enqueue handle held by every session.
#[derive(Clone)]
pub struct HistoryWriter {
    tx: mpsc::Sender<SaveRequest>,
}

/// Owned by `main`; stops the worker after a final flush.
pub struct WriterShutdown {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl WriterShutdown {
    /// Signal the worker, then wait until queued saves have been flushed.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "history writer task failed");
        }
    }
}

impl HistoryWriter {
    /// Best-effort, non-blocking enqueue of a full-history save.
    ///
    /// Returns `false` if the save was dropped.
    pub fn enqueue(&self, board_id: &BoardId, history: &History) -> bool {
        let request = SaveRequest { board_id: board_id.clone(), history: history.clone() };
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%board_id, "history persist queue full; dropping save");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(%board_id, "history persist queue closed; dropping save");
                false
            }
        }
    }
}

/// Spawn the history writer worker.
#[must_use]
pub fn spawn_history_writer(store: Arc<dyn BoardStore>, config: PersistConfig) -> (HistoryWriter, WriterShutdown) {
    let (tx, mut rx) = mpsc::channel::<SaveRequest>(config.queue_capacity);
    let (stop, mut stop_rx) = oneshot::channel::<()>();

    info!(
        queue_capacity = config.queue_capacity,
        flush_ms = u64::try_from(config.flush_interval.as_millis()).unwrap_or(u64::MAX),
        retries = config.retries,
        "history writer configured"
    );

    let task = tokio::spawn(async move {
        let mut pending = PendingSaves::default();
        let mut ticker = tokio::time::interval(config.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // A dropped WriterShutdown detaches the worker; it then runs until
        // every HistoryWriter is gone.
        let mut detached = false;

        loop {
            tokio::select! {
                maybe_request = rx.recv() => {
                    if let Some(request) = maybe_request {
                        pending.push(request);
                    } else {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    flush_pending(store.as_ref(), &mut pending, config).await;
                }
                stop = &mut stop_rx, if !detached => {
                    if stop.is_err() {
                        debug!("history writer shutdown handle dropped; running until writers close");
                        detached = true;
                    } else {
                        rx.close();
                        while let Some(request) = rx.recv().await {
                            pending.push(request);
                        }
                        break;
                    }
                }
            }
        }

        flush_pending(store.as_ref(), &mut pending, config).await;
        info!("history writer stopped");
    });

    (HistoryWriter { tx }, WriterShutdown { stop, task })
}

// =============================================================================
// COALESCING
// =============================================================================

/// Newest pending history per board, flushed in first-arrival order.
#[derive(Default)]
struct PendingSaves {
    order: Vec<BoardId>,
    latest: HashMap<BoardId, History>,
}

impl PendingSaves {
    fn push(&mut self, request: SaveRequest) {
        if self
            .latest
            .insert(request.board_id.clone(), request.history)
            .is_none()
        {
            self.order.push(request.board_id);
        } else {
            debug!(board_id = %request.board_id, "coalesced pending history save");
        }
    }

    fn drain(&mut self) -> Vec<(BoardId, History)> {
        let mut latest = std::mem::take(&mut self.latest);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|board_id| latest.remove(&board_id).map(|history| (board_id, history)))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

async fn flush_pending(store: &dyn BoardStore, pending: &mut PendingSaves, config: PersistConfig) {
    if pending.is_empty() {
        return;
    }

    for (board_id, history) in pending.drain() {
        save_with_retry(store, &board_id, &history, config).await;
    }
}

async fn save_with_retry(store: &dyn BoardStore, board_id: &BoardId, history: &History, config: PersistConfig) {
    for attempt in 1..=config.retries {
        match store.save_board(board_id, history).await {
            Ok(_) => {
                debug!(%board_id, events = history.len(), "board history saved");
                return;
            }
            Err(e) if e.retryable() && attempt < config.retries => {
                warn!(error = %e, %board_id, attempt, total = config.retries, "history save failed; retrying");
                let step = u32::try_from(attempt).unwrap_or(u32::MAX);
                tokio::time::sleep(config.retry_base.saturating_mul(step)).await;
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), %board_id, attempt, "history save failed; dropping");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
