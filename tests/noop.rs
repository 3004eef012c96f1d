//! Built without the `profile` feature every operation is inert.
//!
//! Run with: cargo test --no-default-features --test noop

#![cfg(not(feature = "profile"))]

use region_profiler::{profile_scope, ProfileConfig, Profiler};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn stub_types_are_zero_sized() {
    assert_eq!(std::mem::size_of::<Profiler>(), 0);
}

#[test]
fn operations_record_nothing() {
    let profiler = Profiler::new();
    profiler.start("x");
    thread::sleep(Duration::from_millis(1));
    profiler.stop("x");
    profiler.add_bytes("x", 4096);
    {
        let _guard = profiler.scope("guarded");
    }
    profiler.scope("explicit").stop();

    assert!(profiler.entries().is_empty());
    assert!(profiler.entry("x").is_none());
    assert!(profiler.is_empty());
    assert_eq!(profiler.len(), 0);
    profiler.clear();
}

#[test]
fn global_functions_record_nothing() {
    region_profiler::start("g");
    region_profiler::stop("g");
    region_profiler::add_bytes("g", 1);
    {
        profile_scope!("g.scope");
        let _guard = region_profiler::scope("g.guard");
    }
    region_profiler::clear();
    assert!(region_profiler::entries().is_empty());
}

#[test]
fn dump_writes_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    let entries = vec![region_profiler::ProfileEntry::new("x", 1, 1.0, 0)];
    region_profiler::dump(&entries, &path);
    assert!(!path.exists());

    let profiler = Profiler::new();
    profiler.report(&path);
    profiler.finish(&ProfileConfig {
        output: Some(path.clone()),
        summary_top: 10,
    });
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
