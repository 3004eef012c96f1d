use std::cell::RefCell;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::ProfileConfig;
use crate::entry::{sort_by_cost, ProfileEntry};
use crate::report::{dump, log_summary};

static NEXT_PROFILER_ID: AtomicU64 = AtomicU64::new(0);
static GLOBAL: OnceLock<Profiler> = OnceLock::new();

#[derive(Clone, Copy)]
struct TimerState {
    start: Instant,
    active: bool,
}

type RegionTimers = FxHashMap<String, TimerState>;

thread_local! {
    // Keyed by profiler id so isolated instances on one thread never share timers.
    static THREAD_TIMERS: RefCell<FxHashMap<u64, RegionTimers>> =
        RefCell::new(FxHashMap::default());
}

/// Aggregates per-thread region timings into shared totals.
///
/// `start` only touches thread-local state. `stop` computes the elapsed time
/// locally and then takes the registry lock for a single upsert, so the lock
/// is never held across a timed region or any I/O.
#[derive(Debug)]
pub struct Profiler {
    id: u64,
    entries: Mutex<FxHashMap<String, ProfileEntry>>,
}

impl Profiler {
    /// Creates an empty, isolated profiler.
    pub fn new() -> Self {
        Self {
            id: NEXT_PROFILER_ID.fetch_add(1, Ordering::Relaxed),
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Process-wide profiler, created on first use.
    pub fn global() -> &'static Profiler {
        GLOBAL.get_or_init(Profiler::new)
    }

    /// Starts (or restarts) the calling thread's timer for `name`.
    ///
    /// A second `start` without a `stop` silently replaces the start instant.
    #[inline]
    pub fn start(&self, name: &str) {
        let _ = THREAD_TIMERS.try_with(|timers| {
            let mut timers = timers.borrow_mut();
            let regions = timers.entry(self.id).or_default();
            match regions.get_mut(name) {
                Some(state) => {
                    state.active = true;
                    state.start = Instant::now();
                }
                None => {
                    regions.insert(
                        name.to_owned(),
                        TimerState {
                            start: Instant::now(),
                            active: true,
                        },
                    );
                }
            }
        });
    }

    /// Stops the calling thread's timer for `name` and folds the interval
    /// into the shared totals. Does nothing if no timer is active.
    #[inline]
    pub fn stop(&self, name: &str) {
        let stop_time = Instant::now();
        let elapsed = THREAD_TIMERS
            .try_with(|timers| {
                let mut timers = timers.borrow_mut();
                let state = timers.get_mut(&self.id)?.get_mut(name)?;
                if !state.active {
                    return None;
                }
                state.active = false;
                Some(stop_time.saturating_duration_since(state.start))
            })
            .ok()
            .flatten();
        let Some(elapsed) = elapsed else {
            return;
        };
        self.update(name, |entry| {
            entry.calls += 1;
            entry.total_seconds += elapsed.as_secs_f64();
        });
    }

    /// Adds `bytes` to the region's byte total without touching any timer.
    #[inline]
    pub fn add_bytes(&self, name: &str, bytes: u64) {
        self.update(name, |entry| {
            entry.total_bytes = entry.total_bytes.saturating_add(bytes);
        });
    }

    /// Starts `name` and returns a guard that stops it when dropped.
    pub fn scope<'a>(&'a self, name: &'a str) -> ScopedTimer<'a> {
        self.start(name);
        ScopedTimer {
            profiler: self,
            name,
            released: false,
        }
    }

    /// Snapshot of all regions, sorted by total seconds descending.
    pub fn entries(&self) -> Vec<ProfileEntry> {
        let mut snapshot: Vec<ProfileEntry> = {
            let entries = self.entries.lock();
            entries.values().cloned().collect()
        };
        sort_by_cost(&mut snapshot);
        snapshot
    }

    /// Copy of a single region's totals.
    pub fn entry(&self, name: &str) -> Option<ProfileEntry> {
        self.entries.lock().get(name).cloned()
    }

    /// Number of regions in the registry.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the registry holds no regions.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Empties the shared registry. Per-thread timers are left as they are.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Writes the current snapshot to `path`.
    pub fn report(&self, path: impl AsRef<Path>) {
        dump(&self.entries(), path);
    }

    /// End-of-run hook: logs the most expensive regions and, if configured,
    /// writes the report.
    pub fn finish(&self, config: &ProfileConfig) {
        let entries = self.entries();
        log_summary(&entries, config.summary_top);
        if let Some(path) = config.output.as_ref() {
            dump(&entries, path);
        }
    }

    fn update(&self, name: &str, apply: impl FnOnce(&mut ProfileEntry)) {
        let mut entries = self.entries.lock();
        match entries.get_mut(name) {
            Some(entry) => apply(entry),
            None => {
                let mut entry = ProfileEntry::new(name, 0, 0.0, 0);
                apply(&mut entry);
                entries.insert(name.to_owned(), entry);
            }
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Profiler {
    fn drop(&mut self) {
        let id = self.id;
        let _ = THREAD_TIMERS.try_with(|timers| {
            timers.borrow_mut().remove(&id);
        });
    }
}

/// Guard returned by [`Profiler::scope`]; stops its region exactly once.
#[must_use = "dropping the guard immediately records a near-zero interval; bind it with `let _guard = ...`"]
pub struct ScopedTimer<'a> {
    profiler: &'a Profiler,
    name: &'a str,
    released: bool,
}

impl ScopedTimer<'_> {
    /// Region this guard is timing.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Stops the region before the end of the enclosing scope.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.profiler.stop(self.name);
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn start_stop_counts_one_call() {
        let profiler = Profiler::new();
        profiler.start("solve");
        thread::sleep(Duration::from_millis(5));
        profiler.stop("solve");

        let entry = profiler.entry("solve").expect("entry");
        assert_eq!(entry.calls, 1);
        assert!(entry.total_seconds >= 0.005, "{}", entry.total_seconds);
        assert_eq!(entry.total_bytes, 0);
    }

    #[test]
    fn stop_without_start_is_ignored() {
        let profiler = Profiler::new();
        profiler.stop("never");
        assert!(profiler.entry("never").is_none());
        assert!(profiler.is_empty());
    }

    #[test]
    fn double_stop_counts_once() {
        let profiler = Profiler::new();
        profiler.start("x");
        profiler.stop("x");
        profiler.stop("x");
        assert_eq!(profiler.entry("x").map(|e| e.calls), Some(1));
    }

    #[test]
    fn restart_overwrites_start_instant() {
        let profiler = Profiler::new();
        profiler.start("x");
        thread::sleep(Duration::from_millis(30));
        profiler.start("x");
        profiler.stop("x");
        let entry = profiler.entry("x").expect("entry");
        assert_eq!(entry.calls, 1);
        assert!(entry.total_seconds < 0.030, "{}", entry.total_seconds);
    }

    #[test]
    fn instances_do_not_share_timers() {
        let a = Profiler::new();
        let b = Profiler::new();
        a.start("shared");
        b.stop("shared");
        assert!(b.is_empty());
        a.stop("shared");
        assert_eq!(a.entry("shared").map(|e| e.calls), Some(1));
    }

    #[test]
    fn guard_stop_releases_once() {
        let profiler = Profiler::new();
        let guard = profiler.scope("early");
        assert_eq!(guard.name(), "early");
        guard.stop();
        assert_eq!(profiler.entry("early").map(|e| e.calls), Some(1));
    }

    #[test]
    fn guard_stops_on_panic() {
        let profiler = Profiler::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = profiler.scope("unwind");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(profiler.entry("unwind").map(|e| e.calls), Some(1));
    }

    #[test]
    fn clear_keeps_active_thread_timer() {
        let profiler = Profiler::new();
        profiler.start("phase");
        profiler.stop("phase");
        profiler.start("phase");
        profiler.clear();
        assert!(profiler.entries().is_empty());
        profiler.stop("phase");
        assert_eq!(profiler.entry("phase").map(|e| e.calls), Some(1));
    }
}
