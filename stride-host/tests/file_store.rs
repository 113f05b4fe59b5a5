//! Pedometer state on disk across restarts

use chrono::{DateTime, FixedOffset, TimeZone};
use stride_core::engine::Startup;
use stride_core::traits::{ManualClock, ManualTimer};
use stride_core::EngineConfig;
use stride_hal::StorageKey;
use stride_host::adapters::FileStore;
use stride_host::Pedometer;

fn at(d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(-5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, d, h, mi, 0)
        .unwrap()
}

fn open(dir: &std::path::Path, now: DateTime<FixedOffset>) -> Pedometer<FileStore, ManualClock, ManualTimer> {
    let store = FileStore::open(dir).unwrap();
    Pedometer::new(store, ManualClock::at(now), ManualTimer::new(), EngineConfig::default())
}

#[test]
fn test_state_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = open(dir.path(), at(4, 9, 0));
    first.boot(Some("21:00"));
    for _ in 0..5 {
        first.add_manual_step();
    }
    first.shutdown();
    drop(first);

    for key in [StorageKey::StepRecord, StorageKey::ResetTime] {
        assert!(dir.path().join(format!("{}.bin", key.name())).exists());
    }

    // Same period: the count carries over
    let mut second = open(dir.path(), at(4, 20, 59));
    let boot = second.boot(Some("06:00"));
    assert_eq!(boot.startup, Startup::Restored(5));
    assert_eq!(second.reset_time().to_string(), "21:00");
    second.shutdown();
    drop(second);

    // Next evening: the 21:00 boundary was missed while stopped
    let mut third = open(dir.path(), at(5, 22, 0));
    let boot = third.boot(None);
    let entry = boot.caught_up.expect("missed boundary archived");
    assert_eq!(entry.steps, 5);
    assert_eq!(entry.date, "2024-03-06T03:00:00.000Z");
    assert_eq!(third.current_steps(), 0);
    assert_eq!(third.history(), vec![entry]);
}

#[test]
fn test_corrupt_files_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("step-record.bin"), [0xff, 0xff]).unwrap();
    std::fs::write(dir.path().join("reset-time.bin"), b"99:99").unwrap();
    std::fs::write(dir.path().join("history.bin"), [0x09]).unwrap();

    let mut p = open(dir.path(), at(4, 9, 0));
    let boot = p.boot(None);
    assert_eq!(boot.startup, Startup::Fresh);
    assert_eq!(boot.caught_up, None);
    assert_eq!(p.reset_time().to_string(), "00:00");
    assert!(p.history().is_empty());

    // The next write replaces the corrupt record
    assert_eq!(p.add_manual_step(), 1);
    let mut reopened = open(dir.path(), at(4, 10, 0));
    assert_eq!(reopened.boot(None).startup, Startup::Restored(1));
}
