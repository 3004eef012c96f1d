//! Per-region aggregate record.

/// Aggregated statistics for one named region.
///
/// `calls` counts completed start/stop pairs; `total_bytes` is fed
/// independently by `add_bytes`, so an entry may have bytes and no calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEntry {
    /// Region name.
    pub name: String,
    /// Number of completed timer intervals.
    pub calls: u64,
    /// Sum of all interval durations, in seconds.
    pub total_seconds: f64,
    /// Bytes reported against this region.
    pub total_bytes: u64,
}

impl ProfileEntry {
    /// Creates an entry with explicit totals.
    pub fn new(name: impl Into<String>, calls: u64, total_seconds: f64, total_bytes: u64) -> Self {
        Self {
            name: name.into(),
            calls,
            total_seconds,
            total_bytes,
        }
    }

    /// Mean seconds per call, or `0.0` when the region never completed a call.
    pub fn avg_seconds(&self) -> f64 {
        if self.calls > 0 {
            self.total_seconds / self.calls as f64
        } else {
            0.0
        }
    }

    /// Bytes per second over the timed total, if both are nonzero.
    pub fn throughput(&self) -> Option<f64> {
        (self.total_bytes > 0 && self.total_seconds > 0.0)
            .then(|| self.total_bytes as f64 / self.total_seconds)
    }
}

/// Sorts entries by `total_seconds`, largest first.
///
/// Ties keep their incoming order; callers must not rely on it since the
/// registry iterates in hash order.
pub fn sort_by_cost(entries: &mut [ProfileEntry]) {
    entries.sort_by(|a, b| b.total_seconds.total_cmp(&a.total_seconds));
}
