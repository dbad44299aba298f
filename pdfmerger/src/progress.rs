//! Progress reporting for long-running operations.
//!
//! Operations count discrete steps and hand a [`Progress`] value to a
//! [`ProgressSink`] after each one. Ingestion counts two half-steps per
//! input (started, finished); assembly counts one step per entity or page.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Completed steps out of a known total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Steps completed so far.
    pub completed: usize,
    /// Total number of steps.
    pub total: usize,
}

impl Progress {
    /// Create a progress value.
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Completion as a percentage in `0.0..=100.0`.
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Whether every step has completed.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    /// Called after every completed step.
    fn report(&self, progress: Progress);

    /// Called once the operation ends, whether it succeeded or not.
    fn reset(&self) {}
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Sink that keeps every update, for inspection after the fact.
#[derive(Debug, Default)]
pub struct RecordedProgress {
    updates: Mutex<Vec<Progress>>,
    resets: AtomicUsize,
}

impl RecordedProgress {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates received so far, in arrival order.
    pub fn updates(&self) -> Vec<Progress> {
        self.updates
            .lock()
            .map(|u| u.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Percentages received so far, in arrival order.
    pub fn percents(&self) -> Vec<f64> {
        self.updates().iter().map(Progress::percent).collect()
    }

    /// Number of times the sink was reset.
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl ProgressSink for RecordedProgress {
    fn report(&self, progress: Progress) {
        match self.updates.lock() {
            Ok(mut updates) => updates.push(progress),
            Err(poisoned) => poisoned.into_inner().push(progress),
        }
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shared step counter feeding a sink.
///
/// Safe to advance from concurrently polled futures; every call reports a
/// strictly larger `completed` value.
pub(crate) struct StepCounter<'a> {
    sink: &'a dyn ProgressSink,
    completed: AtomicUsize,
    total: usize,
}

impl<'a> StepCounter<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, total: usize) -> Self {
        Self {
            sink,
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Mark one more step as done and report it.
    pub(crate) fn advance(&self) -> Progress {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let progress = Progress::new(completed.min(self.total), self.total);
        self.sink.report(progress);
        progress
    }
}
