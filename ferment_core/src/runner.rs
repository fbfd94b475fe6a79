//! Cycle driver: runs the controller until told to stop.
//!
//! Shutdown is cooperative. It is checked at the top of the loop and during
//! the pause between cycles, so a cycle in progress always completes.

use std::cell::Cell;
use std::time::Duration;

use crossbeam_channel as xch;

use crate::controller::Controller;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Pause between cycles.
    pub interval: Duration,
    /// Stop after this many cycles; `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_cycles: None,
        }
    }
}

impl From<&crate::config::LoopCfg> for RunParams {
    fn from(c: &crate::config::LoopCfg) -> Self {
        Self {
            interval: c.interval,
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failed_steps: u64,
    pub stopped_by_signal: bool,
}

/// Sending half; cheap to clone into a signal handler.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(xch::Sender<()>);

impl ShutdownHandle {
    pub fn request(&self) {
        // Full means a request is already pending.
        let _ = self.0.try_send(());
    }
}

/// Receiving half, owned by the driver. Latches once a stop was seen.
/// A dropped handle counts as a stop request.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: xch::Receiver<()>,
    latched: Cell<bool>,
}

impl ShutdownSignal {
    pub fn requested(&self) -> bool {
        if self.latched.get() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(()) | Err(xch::TryRecvError::Disconnected) => {
                self.latched.set(true);
                true
            }
            Err(xch::TryRecvError::Empty) => false,
        }
    }

    /// Sleep up to `d`; returns early with `true` on a stop request.
    pub fn wait(&self, d: Duration) -> bool {
        if self.latched.get() {
            return true;
        }
        match self.rx.recv_timeout(d) {
            Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => {
                self.latched.set(true);
                true
            }
            Err(xch::RecvTimeoutError::Timeout) => false,
        }
    }
}

pub fn shutdown_signal() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = xch::bounded(1);
    (
        ShutdownHandle(tx),
        ShutdownSignal {
            rx,
            latched: Cell::new(false),
        },
    )
}

pub fn run(controller: &mut Controller, params: RunParams, shutdown: &ShutdownSignal) -> RunSummary {
    let mut summary = RunSummary::default();
    tracing::info!(
        interval_ms = u64::try_from(params.interval.as_millis()).unwrap_or(u64::MAX),
        max_cycles = ?params.max_cycles,
        "control loop started"
    );
    loop {
        if shutdown.requested() {
            summary.stopped_by_signal = true;
            break;
        }
        let report = controller.cycle();
        summary.cycles += 1;
        summary.failed_steps += report.failed_steps() as u64;

        if params.max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }
        if shutdown.wait(params.interval) {
            summary.stopped_by_signal = true;
            break;
        }
    }
    tracing::info!(
        cycles = summary.cycles,
        failed_steps = summary.failed_steps,
        by_signal = summary.stopped_by_signal,
        "control loop stopped"
    );
    summary
}
