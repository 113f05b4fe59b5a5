//! Event loop behavior on the paused tokio clock

use std::cell::RefCell;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};
use stride_core::traits::ManualClock;
use stride_core::{AccelerationSample, EngineConfig, KvStepStore, MemoryStore, StepStore, WakeTimer};
use stride_host::console;
use stride_host::runtime::{Command, Runtime};
use tokio::sync::{mpsc, oneshot};

const STEP: AccelerationSample = AccelerationSample::new(0.0, 0.0, 14.0);

fn at(h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 1, h, mi, s)
        .unwrap()
}

fn seeded(reset: &str) -> MemoryStore {
    let mut store = KvStepStore::new(MemoryStore::new());
    assert!(store.set_reset_time(reset));
    store.into_inner()
}

async fn ask<T>(
    commands: &mpsc::Sender<Command>,
    make: impl FnOnce(oneshot::Sender<T>) -> Command,
) -> T {
    let (reply, rx) = oneshot::channel();
    commands.send(make(reply)).await.unwrap();
    rx.await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_wake_archives_and_rearms() {
    let clock = ManualClock::at(at(14, 59, 59));
    let mut runtime = Runtime::new(seeded("15:00"), clock.clone(), EngineConfig::default());
    let boot = runtime.pedometer_mut().boot(None);
    assert_eq!(boot.next_reset_ms, at(15, 0, 0).timestamp_millis());

    let (_sample_tx, samples) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel(8);

    let driver = async {
        ask(&commands, |reply| Command::Step { reply }).await;
        let steps = ask(&commands, |reply| Command::Step { reply }).await;
        assert_eq!(steps, 2);

        // Wall clock and timer reach the boundary together
        clock.set(at(15, 0, 0));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let status = ask(&commands, |reply| Command::Status { reply }).await;
        let history = ask(&commands, |reply| Command::History { reply }).await;
        commands.send(Command::Shutdown).await.unwrap();
        (status, history)
    };

    let ((), (status, history)) = tokio::join!(runtime.run(samples, command_rx), driver);

    assert_eq!(status.steps, 0);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].steps, 2);
    assert_eq!(history[0].date, "2024-01-01T15:00:00.000Z");
    assert!(!runtime.pedometer().scheduler().timer().is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_samples_drive_the_count() {
    let clock = ManualClock::at(at(10, 0, 0));
    let mut runtime = Runtime::new(MemoryStore::new(), clock.clone(), EngineConfig::default());
    runtime.pedometer_mut().boot(None);

    let (sample_tx, samples) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel(8);

    let driver = async {
        for advance in [0, 100, 250, 400] {
            clock.advance_ms(advance);
            sample_tx.send(STEP).unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // A closed sample feed leaves commands working
        drop(sample_tx);
        let status = ask(&commands, |reply| Command::Status { reply }).await;
        commands.send(Command::Shutdown).await.unwrap();
        status
    };

    let ((), status) = tokio::join!(runtime.run(samples, command_rx), driver);
    // Steps at 0, 350, and 750 ms count; the one at 100 ms is debounced
    assert_eq!(status.steps, 3);
}

#[tokio::test(start_paused = true)]
async fn test_stops_when_senders_dropped() {
    let clock = ManualClock::at(at(10, 0, 0));
    let mut runtime = Runtime::new(MemoryStore::new(), clock, EngineConfig::default());
    runtime.pedometer_mut().boot(None);
    assert!(runtime.pedometer().scheduler().timer().is_armed());

    let (_sample_tx, samples) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel::<Command>(1);
    drop(commands);

    runtime.run(samples, command_rx).await;
    assert!(!runtime.pedometer().scheduler().timer().is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_console_session() {
    let clock = ManualClock::at(at(10, 0, 0));
    let mut runtime = Runtime::new(MemoryStore::new(), clock, EngineConfig::default());
    runtime.pedometer_mut().boot(None);

    let (_sample_tx, samples) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel(8);
    let (line_tx, lines) = mpsc::unbounded_channel();
    for line in ["step", "", "time 7:00", "time 07:00", "history", "quit", "step"] {
        line_tx.send(line.to_string()).unwrap();
    }

    let output = RefCell::new(Vec::new());
    let session = console::serve(lines, commands, |rendered| {
        output.borrow_mut().push(rendered.to_string())
    });
    tokio::join!(runtime.run(samples, command_rx), session);

    assert_eq!(
        output.into_inner(),
        vec![
            "steps: 1".to_string(),
            "rejected \"7:00\": expected HH:MM (00:00-23:59)".to_string(),
            "reset time set to 07:00".to_string(),
            "no history yet".to_string(),
        ]
    );
    // The line after `quit` was never dispatched
    assert_eq!(runtime.pedometer().current_steps(), 1);
    assert_eq!(runtime.pedometer().reset_time().to_string(), "07:00");
}
