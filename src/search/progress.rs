//! Progress reporting and cooperative cancellation for a running search.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Preparing series, ranges, and the reference cost.
    Estimating,
    Simulating,
    /// Materialising retained candidates into solutions.
    Selecting,
    Done,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchPhase::Estimating => "estimating",
            SearchPhase::Simulating => "simulating",
            SearchPhase::Selecting => "selecting",
            SearchPhase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Snapshot sent to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Candidates finished so far.
    pub current: usize,
    pub total: usize,
    pub phase: SearchPhase,
    pub feasible_count: usize,
    /// Lowest estimated cost among feasible candidates.
    pub best_cost_so_far: Option<f64>,
}

/// Receives progress snapshots, possibly from several worker threads.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Shared flag polled between candidates.
///
/// Clones share the same flag, so a caller can keep one handle and pass
/// another into the search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lock-free counters behind the progress snapshots of one search.
pub(crate) struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    total: usize,
    interval: usize,
    done: AtomicUsize,
    feasible: AtomicUsize,
    /// `f64` bits of the lowest feasible cost; `+inf` until one is found.
    best_cost: AtomicU64,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, total: usize, interval: usize) -> Self {
        Self {
            sink,
            total,
            interval: interval.max(1),
            done: AtomicUsize::new(0),
            feasible: AtomicUsize::new(0),
            best_cost: AtomicU64::new(f64::INFINITY.to_bits()),
        }
    }

    pub(crate) fn phase(&self, phase: SearchPhase) {
        self.sink.report(self.snapshot(phase));
    }

    /// Counts one finished candidate; reports every `interval` candidates.
    pub(crate) fn candidate_done(&self, feasible_cost: Option<f64>) {
        if let Some(cost) = feasible_cost {
            self.feasible.fetch_add(1, Ordering::Relaxed);
            let _ = self
                .best_cost
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                    (cost < f64::from_bits(bits)).then(|| cost.to_bits())
                });
        }
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.interval == 0 {
            self.sink.report(self.snapshot(SearchPhase::Simulating));
        }
    }

    pub(crate) fn snapshot(&self, phase: SearchPhase) -> Progress {
        let best = f64::from_bits(self.best_cost.load(Ordering::Relaxed));
        Progress {
            current: self.done.load(Ordering::Relaxed),
            total: self.total,
            phase,
            feasible_count: self.feasible.load(Ordering::Relaxed),
            best_cost_so_far: best.is_finite().then_some(best),
        }
    }
}
