//! Named-region timing with per-thread start state and shared totals.
//!
//! With the `profile` feature enabled this module carries the full engine.
//! Without it, every type is zero-sized and every call compiles away;
//! `entries()` is always empty and nothing is ever written.
//!
//! The free functions below all forward to [`Profiler::global`].

#[cfg(feature = "profile")]
mod real;
#[cfg(not(feature = "profile"))]
mod stub;

#[cfg(feature = "profile")]
pub use real::*;
#[cfg(not(feature = "profile"))]
pub use stub::*;

use crate::entry::ProfileEntry;

/// Starts `name` on the global profiler.
#[inline]
pub fn start(name: &str) {
    Profiler::global().start(name);
}

/// Stops `name` on the global profiler.
#[inline]
pub fn stop(name: &str) {
    Profiler::global().stop(name);
}

/// Adds `bytes` to `name` on the global profiler.
#[inline]
pub fn add_bytes(name: &str, bytes: u64) {
    Profiler::global().add_bytes(name, bytes);
}

/// Guard on the global profiler for the lifetime of the returned value.
#[inline]
pub fn scope(name: &str) -> ScopedTimer<'_> {
    Profiler::global().scope(name)
}

/// Sorted snapshot of the global profiler.
pub fn entries() -> Vec<ProfileEntry> {
    Profiler::global().entries()
}

/// Clears the global profiler's registry.
pub fn clear() {
    Profiler::global().clear();
}

/// Times the rest of the enclosing block under `name` on the global profiler.
///
/// ```
/// fn factorize() {
///     region_profiler::profile_scope!("factorize");
///     // ...
/// }
/// # factorize();
/// ```
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_scope_guard = $crate::Profiler::global().scope($name);
    };
}
