#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ferment_core::model::{DigitalInput, Relay, Sensor, Tank, Valve};
use ferment_core::{Controller, MemoryStore, StateStore};
use ferment_gateway::SimulatedGateway;
use ferment_traits::clock::test_clock::TestClock;

pub const SENSOR_CIRCUIT: &str = "28A1";
pub const VALVE_CIRCUIT: &str = "2_01";
pub const ALARM_CIRCUIT: &str = "2_08";
pub const PUMP_RELAY_CIRCUIT: &str = "2_02";
pub const CHILLER_RELAY_CIRCUIT: &str = "2_03";
pub const ESTOP_CIRCUIT: &str = "1_01";
pub const PUMP_DI_CIRCUIT: &str = "1_02";
pub const CHILLER_DI_CIRCUIT: &str = "1_03";

pub struct Rig {
    pub gw: Arc<SimulatedGateway>,
    pub store: Arc<MemoryStore>,
    pub clock: TestClock,
    pub controller: Controller,
}

impl Rig {
    pub fn advance(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }

    pub fn logs_containing(&self, needle: &str) -> usize {
        self.store
            .recent_logs(usize::MAX)
            .iter()
            .filter(|r| r.message.contains(needle))
            .count()
    }
}

/// One tank (target 20 °C) on sensor S1 [0, 25] and valve V1, plus the
/// well-known relays and inputs.
pub fn populated_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_sensor(Sensor::new("S1", SENSOR_CIRCUIT, 0.0, 25.0));
    store.insert_valve(Valve::new("V1", VALVE_CIRCUIT));
    store.insert_tank(Tank::new("T1", 20.0).with_sensor("S1").with_valve("V1"));
    store.insert_relay(Relay::new("Alarm_Relay", ALARM_CIRCUIT));
    store.insert_relay(Relay::new("Pump_Relay", PUMP_RELAY_CIRCUIT));
    store.insert_relay(Relay::new("Chiller_Relay", CHILLER_RELAY_CIRCUIT));
    store.insert_input(DigitalInput::new("Total_Stop_DI", ESTOP_CIRCUIT));
    store.insert_input(DigitalInput::new("Pump_DI", PUMP_DI_CIRCUIT));
    store.insert_input(DigitalInput::new("Chiller_DI", CHILLER_DI_CIRCUIT));
    store
}

pub fn rig() -> Rig {
    let gw = Arc::new(SimulatedGateway::new());
    let store = Arc::new(populated_store());
    let clock = TestClock::new();
    let controller = Controller::builder()
        .with_gateway(gw.clone())
        .with_store(store.clone())
        .with_clock(Arc::new(clock.clone()))
        .with_persist_after(Duration::from_secs(60))
        .build()
        .expect("build controller");
    Rig {
        gw,
        store,
        clock,
        controller,
    }
}
