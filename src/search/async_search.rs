//! Runs a search on the tokio blocking pool with a bounded progress channel.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::{Result, SizingError};

use super::optimizer::{SearchOutcome, SearchRequest, search};
use super::progress::{CancelToken, Progress, SearchPhase};

/// A search running in the background.
pub struct SearchHandle {
    /// Progress snapshots; closes when the search returns. Snapshots are
    /// dropped rather than blocking the workers when the buffer is full.
    pub progress: mpsc::Receiver<Progress>,
    /// Latest phase reported. Never dropped, so after [`SearchHandle::finish`]
    /// it holds the phase the search ended in.
    pub phase: watch::Receiver<SearchPhase>,
    pub cancel: CancelToken,
    join: JoinHandle<Result<SearchOutcome>>,
}

impl SearchHandle {
    /// Requests cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the search to return.
    pub async fn finish(self) -> Result<SearchOutcome> {
        self.join
            .await
            .map_err(|e| SizingError::Worker(e.to_string()))?
    }
}

/// Starts `request` on a blocking thread; must be called inside a tokio runtime.
pub fn spawn_search(request: SearchRequest, buffer: usize) -> SearchHandle {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let (phase_tx, phase) = watch::channel(SearchPhase::Estimating);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let join = tokio::task::spawn_blocking(move || {
        let sink = move |p: Progress| {
            phase_tx.send_if_modified(|current| {
                let changed = *current != p.phase;
                *current = p.phase;
                changed
            });
            let _ = tx.try_send(p);
        };
        search(&request, &sink, &token)
    });
    SearchHandle {
        progress: rx,
        phase,
        cancel,
        join,
    }
}
