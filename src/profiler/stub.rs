#![allow(missing_docs)]

use std::marker::PhantomData;
use std::path::Path;

use crate::config::ProfileConfig;
use crate::entry::ProfileEntry;

static GLOBAL: Profiler = Profiler;

/// Inert profiler when `profile` is disabled (zero-sized).
#[derive(Debug, Default)]
pub struct Profiler;

impl Profiler {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn global() -> &'static Profiler {
        &GLOBAL
    }

    #[inline(always)]
    pub fn start(&self, _name: &str) {}

    #[inline(always)]
    pub fn stop(&self, _name: &str) {}

    #[inline(always)]
    pub fn add_bytes(&self, _name: &str, _bytes: u64) {}

    #[inline(always)]
    pub fn scope<'a>(&'a self, name: &'a str) -> ScopedTimer<'a> {
        ScopedTimer {
            name,
            _profiler: PhantomData,
        }
    }

    #[inline(always)]
    pub fn entries(&self) -> Vec<ProfileEntry> {
        Vec::new()
    }

    #[inline(always)]
    pub fn entry(&self, _name: &str) -> Option<ProfileEntry> {
        None
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        0
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        true
    }

    #[inline(always)]
    pub fn clear(&self) {}

    #[inline(always)]
    pub fn report(&self, _path: impl AsRef<Path>) {}

    #[inline(always)]
    pub fn finish(&self, _config: &ProfileConfig) {}
}

/// Dummy guard when `profile` is disabled.
#[must_use = "dropping the guard immediately records a near-zero interval; bind it with `let _guard = ...`"]
pub struct ScopedTimer<'a> {
    name: &'a str,
    _profiler: PhantomData<&'a Profiler>,
}

impl ScopedTimer<'_> {
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name
    }

    #[inline(always)]
    pub fn stop(self) {}
}
