//! `From` implementations bridging `ferment_config` types to `ferment_core` types.

use std::time::Duration;

use crate::config::{LoopCfg, MirrorPair, RoleNames};
use crate::model::{DigitalInput, Relay, Sensor, Tank, Valve};

// ── Loop / roles ─────────────────────────────────────────────────────────────

impl From<&ferment_config::Config> for LoopCfg {
    fn from(c: &ferment_config::Config) -> Self {
        Self {
            interval: Duration::from_millis(c.cycle.interval_ms),
            persist_after: Duration::from_secs(c.faults.persist_after_s),
        }
    }
}

impl From<&ferment_config::RolesCfg> for RoleNames {
    fn from(c: &ferment_config::RolesCfg) -> Self {
        Self {
            alarm_relay: c.alarm_relay.clone(),
            estop_input: c.estop_input.clone(),
            mirrors: c
                .mirrors
                .iter()
                .map(|m| MirrorPair::new(m.input.clone(), m.relay.clone()))
                .collect(),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

impl From<&ferment_config::SensorCfg> for Sensor {
    fn from(c: &ferment_config::SensorCfg) -> Self {
        Sensor::new(c.name.clone(), c.circuit.clone(), c.min_temp, c.max_temp)
    }
}

impl From<&ferment_config::TankCfg> for Tank {
    fn from(c: &ferment_config::TankCfg) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone(),
            target_temperature: c.target_temperature,
            sensor: c.sensor.clone(),
            valve: c.valve.clone(),
        }
    }
}

impl From<&ferment_config::ChannelCfg> for Valve {
    fn from(c: &ferment_config::ChannelCfg) -> Self {
        Valve::new(c.name.clone(), c.circuit.clone())
    }
}

impl From<&ferment_config::ChannelCfg> for DigitalInput {
    fn from(c: &ferment_config::ChannelCfg) -> Self {
        DigitalInput::new(c.name.clone(), c.circuit.clone())
    }
}

impl From<&ferment_config::ChannelCfg> for Relay {
    fn from(c: &ferment_config::ChannelCfg) -> Self {
        Relay::new(c.name.clone(), c.circuit.clone())
    }
}
