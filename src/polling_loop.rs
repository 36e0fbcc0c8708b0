use std::mem;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{DeviceConfig, PollTiming};
use crate::meter_session::{MeterSession, Reading};

/// Downstream consumer of every sampling cycle's outcome.
pub trait ReadingSink: Send + 'static {
    fn on_reading(&self, reading: Reading);
}

/// Observable state of the polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Sampling,
    Failed,
}

enum LoopState {
    Connecting,
    Sampling(MeterSession),
    Failed,
}

/// Drives the meter forever: connect, sample until something fails, back off, repeat.
pub struct PollingLoop<S> {
    device: DeviceConfig,
    timing: PollTiming,
    sink: S,
    state: LoopState,
}

impl<S: ReadingSink> PollingLoop<S> {
    pub fn new(device: DeviceConfig, timing: PollTiming, sink: S) -> Self {
        Self {
            device,
            timing,
            sink,
            state: LoopState::Connecting,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            LoopState::Connecting => Phase::Connecting,
            LoopState::Sampling(_) => Phase::Sampling,
            LoopState::Failed => Phase::Failed,
        }
    }

    /// Performs exactly one state transition.
    ///
    /// A successful sampling cycle includes the poll interval sleep, a failure
    /// publishes a zero reading, and leaving `Failed` includes the reconnect delay.
    pub async fn step(&mut self) -> Phase {
        // If this future is dropped part way the loop restarts from Failed
        self.state = match mem::replace(&mut self.state, LoopState::Failed) {
            LoopState::Connecting => {
                match MeterSession::connect(&self.device, self.timing.request_timeout).await {
                    Ok(session) => LoopState::Sampling(session),
                    Err(e) => {
                        warn!("Meter connection failed: {e}");
                        self.sink.on_reading(Reading::ZERO);
                        LoopState::Failed
                    }
                }
            }
            LoopState::Sampling(mut session) => match session.read_cycle().await {
                Ok(reading) => {
                    self.sink.on_reading(reading);
                    sleep(self.timing.interval).await;
                    LoopState::Sampling(session)
                }
                Err(e) => {
                    self.sink.on_reading(Reading::ZERO);
                    error!("Meter read from {} failed: {e}", session.peer());
                    LoopState::Failed
                }
            },
            LoopState::Failed => {
                sleep(self.timing.reconnect_delay).await;
                info!("Reconnecting to meter at {}", self.device.address);
                LoopState::Connecting
            }
        };
        self.phase()
    }

    /// Runs until the process exits.
    pub async fn run_forever(mut self) {
        self.log_start();
        loop {
            self.step().await;
        }
    }

    /// Runs until `shutdown` fires. If the sender is dropped without firing, keeps
    /// running forever.
    pub async fn run_until(mut self, mut shutdown: oneshot::Receiver<()>) {
        self.log_start();
        let mut listening = true;
        loop {
            // Pinned outside the select so a dropped sender never cancels a step in
            // flight and tears down a healthy session
            let step = self.step();
            tokio::pin!(step);
            loop {
                tokio::select! {
                    _ = &mut step => break,
                    fired = &mut shutdown, if listening => {
                        if fired.is_ok() {
                            info!("Meter polling stopped");
                            return;
                        }
                        listening = false;
                    }
                }
            }
        }
    }

    fn log_start(&self) {
        info!(
            "Starting meter polling for {} (interval: {:?})",
            self.device.address, self.timing.interval
        );
    }

    /// Starts the loop on a background task.
    pub fn spawn(self) -> PollingHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run_until(shutdown_rx));
        PollingHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a polling loop running in the background.
///
/// Dropping the handle leaves the loop running.
pub struct PollingHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Stops the loop and waits for the task to finish.
    pub async fn shutdown(self) {
        // An Err means the task already ended
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!("Polling task ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
