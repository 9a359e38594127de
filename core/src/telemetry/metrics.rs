use serde::Serialize;
use std::sync::Mutex;

/// Relay frame counters shared across sessions.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sessions: usize,
    pub forwarded: usize,
    pub dropped: usize,
    pub errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_session(&self) {
        self.update(|metrics| metrics.sessions += 1);
    }

    pub fn record_forwarded(&self) {
        self.update(|metrics| metrics.forwarded += 1);
    }

    pub fn record_dropped(&self) {
        self.update(|metrics| metrics.dropped += 1);
    }

    pub fn record_error(&self) {
        self.update(|metrics| metrics.errors += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
