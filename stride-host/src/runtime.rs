//! Event loop
//!
//! A single task owns the pedometer. Sensor samples, timer wake-ups, and
//! user commands reach it over channels, so the core types never leave the
//! thread they were created on.

use stride_core::{AccelerationSample, Clock, EngineConfig, HistoryEntry};
use stride_hal::KeyValueStore;
use tokio::sync::{mpsc, oneshot};

use crate::adapters::{TokioWakeTimer, WakeSignal};
use crate::pedometer::{Pedometer, Status};

/// Capacity of the command channel
pub const COMMAND_QUEUE_DEPTH: usize = 16;

/// Request from the user side
#[derive(Debug)]
pub enum Command {
    /// Count one step by hand; replies with the new count
    Step { reply: oneshot::Sender<u32> },
    /// Archive and zero now
    Reset {
        reply: oneshot::Sender<HistoryEntry>,
    },
    /// Change the daily reset time; replies whether it was accepted
    SetResetTime {
        time: String,
        reply: oneshot::Sender<bool>,
    },
    Status { reply: oneshot::Sender<Status> },
    History {
        reply: oneshot::Sender<Vec<HistoryEntry>>,
    },
    Shutdown,
}

pub type HostPedometer<K, C> = Pedometer<K, C, TokioWakeTimer>;

pub struct Runtime<K, C> {
    pedometer: HostPedometer<K, C>,
    wakes: mpsc::UnboundedReceiver<WakeSignal>,
}

impl<K: KeyValueStore, C: Clock> Runtime<K, C> {
    /// Must be called inside a tokio runtime; the timer spawns tasks
    pub fn new(kv: K, clock: C, config: EngineConfig) -> Self {
        let (timer, wakes) = TokioWakeTimer::new();
        Self {
            pedometer: Pedometer::new(kv, clock, timer, config),
            wakes,
        }
    }

    pub fn pedometer(&self) -> &HostPedometer<K, C> {
        &self.pedometer
    }

    pub fn pedometer_mut(&mut self) -> &mut HostPedometer<K, C> {
        &mut self.pedometer
    }

    /// Serve until [`Command::Shutdown`] or every command sender is gone
    ///
    /// The daily reset is disarmed on return.
    pub async fn run(
        &mut self,
        mut samples: mpsc::UnboundedReceiver<AccelerationSample>,
        mut commands: mpsc::Receiver<Command>,
    ) {
        loop {
            tokio::select! {
                Some(sample) = samples.recv() => {
                    self.pedometer.on_sample(&sample);
                }
                Some(signal) = self.wakes.recv() => {
                    self.handle_wake(signal);
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
        }
        self.pedometer.shutdown();
        tracing::info!("runtime stopped");
    }

    fn handle_wake(&mut self, signal: WakeSignal) {
        if !self.pedometer.scheduler().timer().is_current(signal) {
            tracing::debug!("stale wake-up dropped");
            return;
        }
        if let Some(entry) = self.pedometer.on_wake() {
            tracing::info!(steps = entry.steps, date = %entry.date, "daily reset");
        }
    }

    fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Step { reply } => {
                let _ = reply.send(self.pedometer.add_manual_step());
            }
            Command::Reset { reply } => {
                let _ = reply.send(self.pedometer.reset_now());
            }
            Command::SetResetTime { time, reply } => {
                let _ = reply.send(self.pedometer.update_reset_time(&time));
            }
            Command::Status { reply } => {
                let _ = reply.send(self.pedometer.status());
            }
            Command::History { reply } => {
                let _ = reply.send(self.pedometer.history());
            }
            Command::Shutdown => {}
        }
    }
}
