//! Progress reporting.
//!
//! The pipeline reports through a [`ProgressSink`] passed in by the caller:
//! - `on_progress` at fixed checkpoints with an absolute fraction and status
//! - `add_progress` once per finished (map, level) unit of work
//!
//! Level workers call `add_progress` concurrently, so every sink is `Sync`.
//! [`ProgressTracker`] accumulates atomically and is polled;
//! [`ChannelProgress`] forwards events to a single consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use serde::Serialize;

/// Fixed-point scale used by [`ProgressTracker`].
const PROGRESS_SCALE: f64 = 1_000_000.0;

/// Receives progress from the roughness pipeline.
pub trait ProgressSink: Send + Sync {
    /// Checkpoint: overall progress is now `fraction` (0..=1).
    fn on_progress(&self, fraction: f64, status: &str);

    /// Increment overall progress by `delta`.
    fn add_progress(&self, delta: f64);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _fraction: f64, _status: &str) {}

    fn add_progress(&self, _delta: f64) {}
}

/// A progress event as sent over a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Checkpoint { fraction: f64, status: String },
    Advance { delta: f64 },
}

/// Forwards progress to an `mpsc` receiver.
///
/// A dropped receiver is not an error; events are discarded.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn on_progress(&self, fraction: f64, status: &str) {
        let _ = self.sender.send(ProgressEvent::Checkpoint {
            fraction,
            status: status.to_string(),
        });
    }

    fn add_progress(&self, delta: f64) {
        let _ = self.sender.send(ProgressEvent::Advance { delta });
    }
}

/// Polled progress state shared between the pipeline and an observer.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    value: AtomicU64,
    status: Mutex<String>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        (self.value.load(Ordering::SeqCst) as f64 / PROGRESS_SCALE).clamp(0.0, 1.0)
    }

    /// Status text from the last checkpoint.
    pub fn status(&self) -> String {
        match self.status.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressSink for ProgressTracker {
    fn on_progress(&self, fraction: f64, status: &str) {
        let fixed = (fraction.max(0.0) * PROGRESS_SCALE).round() as u64;
        self.value.store(fixed, Ordering::SeqCst);
        match self.status.lock() {
            Ok(mut s) => *s = status.to_string(),
            Err(poisoned) => *poisoned.into_inner() = status.to_string(),
        }
    }

    fn add_progress(&self, delta: f64) {
        let fixed = (delta.max(0.0) * PROGRESS_SCALE).round() as u64;
        self.value.fetch_add(fixed, Ordering::SeqCst);
    }
}
