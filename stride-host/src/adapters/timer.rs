//! Wake-up timer on the tokio clock
//!
//! Arming spawns a sleep task that posts a [`WakeSignal`] to the runtime's
//! channel. Every arm bumps a generation counter; the runtime drops signals
//! whose generation is stale, which covers the window where a sleep has
//! already fired but its message has not been handled yet.

use std::time::Duration;

use stride_core::WakeTimer;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivered when an armed delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSignal {
    generation: u64,
}

#[derive(Debug)]
pub struct TokioWakeTimer {
    tx: mpsc::UnboundedSender<WakeSignal>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl TokioWakeTimer {
    /// Create a timer and the receiver its wake-ups arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WakeSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Self {
            tx,
            task: None,
            generation: 0,
        };
        (timer, rx)
    }

    /// Whether `signal` comes from the most recent arm
    pub fn is_current(&self, signal: WakeSignal) -> bool {
        self.task.is_some() && signal.generation == self.generation
    }
}

impl WakeTimer for TokioWakeTimer {
    fn arm(&mut self, delay_ms: u64) {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let signal = WakeSignal {
            generation: self.generation,
        };
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // The receiver only goes away at shutdown
            let _ = tx.send(signal);
        }));
        tracing::debug!(delay_ms, generation = self.generation, "wake-up armed");
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioWakeTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut timer, mut rx) = TokioWakeTimer::new();
        timer.arm(1_000);
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        let signal = rx.recv().await.unwrap();
        assert!(timer.is_current(signal));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_supersedes() {
        let (mut timer, mut rx) = TokioWakeTimer::new();
        timer.arm(10);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // First wake-up is queued but not yet handled
        let stale = rx.recv().await.unwrap();

        timer.arm(50);
        assert!(!timer.is_current(stale));

        let fresh = rx.recv().await.unwrap();
        assert!(timer.is_current(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (mut timer, mut rx) = TokioWakeTimer::new();
        timer.arm(100);
        timer.cancel();
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
