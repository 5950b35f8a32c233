use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shared, append-only collection of latency samples in milliseconds.
///
/// Cloning the recorder hands out another handle to the same samples, so
/// every concurrent workflow can own one. Appends are serialized by a mutex.
/// [`LatencyRecorder::snapshot`] gives no point-in-time guarantee while
/// writers are still running; read it after every writer has been joined.
#[derive(Debug, Clone, Default)]
pub struct LatencyRecorder {
    samples: Arc<Mutex<Vec<f64>>>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, latency_ms: f64) {
        self.lock().push(latency_ms);
    }

    pub fn record_duration(&self, latency: Duration) {
        self.record(latency.as_secs_f64() * 1000.);
    }

    /// Copy of the samples in insertion order.
    pub fn snapshot(&self) -> Vec<f64> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every recorded sample.
    pub fn reset(&self) {
        self.lock().clear();
    }

    // NOTE: A writer can only panic between lock and push, which leaves the
    // Vec intact, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<f64>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
