#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Gateway adapters: the EVOK-style HTTP client and an in-memory simulated rig.
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod wire;

#[cfg(feature = "http")]
pub use http::HttpGateway;
pub use wire::Flavor;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use ferment_traits::{BoxError, Gateway, TempPoint};

use crate::error::GatewayError;

/// One relay write observed by the simulated gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayWrite {
    pub circuit: String,
    pub on: bool,
}

#[derive(Debug)]
struct SimState {
    default_temp: TempPoint,
    temps: HashMap<String, TempPoint>,
    inputs: HashMap<String, bool>,
    relays: HashMap<String, bool>,
    offline: HashSet<String>,
    write_faults: HashSet<String>,
    writes: Vec<RelayWrite>,
}

/// Simulated gateway: every circuit answers from in-memory state.
///
/// Unknown temperature circuits report the default temperature; unknown
/// inputs and relays read as off. Circuits can be taken offline (all calls
/// fail) or made to reject writes only.
#[derive(Debug)]
pub struct SimulatedGateway {
    state: Mutex<SimState>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::with_default_temperature(18.0)
    }

    pub fn with_default_temperature(celsius: f32) -> Self {
        SimulatedGateway {
            state: Mutex::new(SimState {
                default_temp: TempPoint::valid(celsius),
                temps: HashMap::new(),
                inputs: HashMap::new(),
                relays: HashMap::new(),
                offline: HashSet::new(),
                write_faults: HashSet::new(),
                writes: Vec::new(),
            }),
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut SimState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s);
        }
    }

    pub fn set_temperature(&self, circuit: &str, celsius: f32) {
        self.with_state(|s| {
            s.temps.insert(circuit.to_string(), TempPoint::valid(celsius));
        });
    }

    /// Report the circuit as lost/invalid while still answering requests.
    pub fn set_lost(&self, circuit: &str) {
        self.with_state(|s| {
            s.temps.insert(circuit.to_string(), TempPoint::lost());
        });
    }

    /// Answer temperature requests on `circuit` with an arbitrary sample.
    pub fn set_point(&self, circuit: &str, point: TempPoint) {
        self.with_state(|s| {
            s.temps.insert(circuit.to_string(), point);
        });
    }

    pub fn set_input(&self, circuit: &str, active: bool) {
        self.with_state(|s| {
            s.inputs.insert(circuit.to_string(), active);
        });
    }

    /// Set the physical relay state without recording a write.
    pub fn set_relay_state(&self, circuit: &str, on: bool) {
        self.with_state(|s| {
            s.relays.insert(circuit.to_string(), on);
        });
    }

    /// Every request touching `circuit` fails until `restore` is called.
    pub fn take_offline(&self, circuit: &str) {
        self.with_state(|s| {
            s.offline.insert(circuit.to_string());
        });
    }

    /// Writes to `circuit` fail; reads keep working.
    pub fn reject_writes(&self, circuit: &str) {
        self.with_state(|s| {
            s.write_faults.insert(circuit.to_string());
        });
    }

    pub fn restore(&self, circuit: &str) {
        self.with_state(|s| {
            s.offline.remove(circuit);
            s.write_faults.remove(circuit);
        });
    }

    /// Physical relay state as last written or set.
    pub fn relay_state(&self, circuit: &str) -> Option<bool> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.relays.get(circuit).copied())
    }

    /// All relay writes observed so far, oldest first.
    pub fn writes(&self) -> Vec<RelayWrite> {
        self.state
            .lock()
            .map(|s| s.writes.clone())
            .unwrap_or_default()
    }

    /// Relay writes to one circuit.
    pub fn writes_to(&self, circuit: &str) -> Vec<bool> {
        self.writes()
            .into_iter()
            .filter(|w| w.circuit == circuit)
            .map(|w| w.on)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.with_state(|s| s.writes.clear());
    }

    fn read<T>(&self, circuit: &str, f: impl FnOnce(&SimState) -> T) -> Result<T, BoxError> {
        let s = self
            .state
            .lock()
            .map_err(|_| GatewayError::Simulated(circuit.to_string()))?;
        if s.offline.contains(circuit) {
            return Err(Box::new(GatewayError::Simulated(circuit.to_string())));
        }
        Ok(f(&s))
    }
}

impl Gateway for SimulatedGateway {
    fn temperature(&self, circuit: &str) -> Result<TempPoint, BoxError> {
        self.read(circuit, |s| {
            s.temps.get(circuit).copied().unwrap_or(s.default_temp)
        })
    }

    fn digital_input(&self, circuit: &str) -> Result<bool, BoxError> {
        self.read(circuit, |s| s.inputs.get(circuit).copied().unwrap_or(false))
    }

    fn relay(&self, circuit: &str) -> Result<bool, BoxError> {
        self.read(circuit, |s| s.relays.get(circuit).copied().unwrap_or(false))
    }

    fn set_relay(&self, circuit: &str, on: bool) -> Result<(), BoxError> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| GatewayError::Simulated(circuit.to_string()))?;
        if s.offline.contains(circuit) || s.write_faults.contains(circuit) {
            return Err(Box::new(GatewayError::Simulated(circuit.to_string())));
        }
        s.relays.insert(circuit.to_string(), on);
        s.writes.push(RelayWrite {
            circuit: circuit.to_string(),
            on,
        });
        tracing::debug!(circuit, on, "relay written (simulated)");
        Ok(())
    }
}
