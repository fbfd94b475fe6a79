//! Per-cycle report and the system status snapshot.

use std::time::Duration;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{DigitalInput, Relay};
use crate::regulate::RegulationSummary;
use crate::sensors::SensorSweep;
use crate::store::StateStore;
use crate::sync::SyncOutcome;

/// Outcome of each step of one cycle. A failed step does not stop later ones.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    pub sensors: Result<SensorSweep, CoreError>,
    pub sync: Result<SyncOutcome, CoreError>,
    pub regulation: Result<RegulationSummary, CoreError>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn failed_steps(&self) -> usize {
        usize::from(self.sensors.is_err())
            + usize::from(self.sync.is_err())
            + usize::from(self.regulation.is_err())
    }

    /// `None` when the regulation step (and so the alarm) did not run.
    pub fn alarm_active(&self) -> Option<bool> {
        self.regulation.as_ref().ok().map(|r| r.alarm.active)
    }

    /// The step errors, in cycle order.
    pub fn errors(&self) -> Vec<&CoreError> {
        [
            self.sensors.as_ref().err(),
            self.sync.as_ref().err(),
            self.regulation.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TankStatus {
    pub name: String,
    pub description: Option<String>,
    pub target_temperature: f32,
    pub sensor: Option<String>,
    pub temperature: Option<f32>,
    pub sensor_fault: bool,
    pub valve: Option<String>,
    pub valve_open: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub tanks: Vec<TankStatus>,
    pub inputs: Vec<DigitalInput>,
    pub relays: Vec<Relay>,
    pub alarm_active: bool,
}

/// Read-only view of the rig as last stored.
pub fn snapshot(store: &dyn StateStore, alarm_relay: &str) -> SystemStatus {
    let tanks = store
        .tanks()
        .into_iter()
        .map(|t| {
            let sensor = t.sensor.as_deref().and_then(|n| store.sensor(n));
            let valve = t.valve.as_deref().and_then(|n| store.valve(n));
            TankStatus {
                temperature: sensor.as_ref().and_then(|s| s.current_temperature),
                sensor_fault: sensor.as_ref().is_some_and(|s| s.error_active),
                sensor: sensor.map(|s| s.name),
                valve_open: valve.as_ref().map(|v| v.is_open),
                valve: valve.map(|v| v.name),
                name: t.name,
                description: t.description,
                target_temperature: t.target_temperature,
            }
        })
        .collect();
    SystemStatus {
        tanks,
        inputs: store.inputs(),
        relays: store.relays(),
        alarm_active: store.relay(alarm_relay).is_some_and(|r| r.is_active),
    }
}
