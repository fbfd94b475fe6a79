//! Device gateway client.
//!
//! Every call is total: transport and decode failures are logged and turned
//! into `None` / `Validity::Unknown` / `false`, never propagated. "No data"
//! and "confirmed false" stay distinguishable in the return types.

use std::sync::Arc;

use ferment_traits::{BoxError, Gateway};

use crate::gateway_error::classify;

/// Outcome of a sensor validity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    /// The gateway could not be asked.
    Unknown,
}

impl Validity {
    /// Only a confirmed-valid reading is trusted; unknown counts as invalid.
    pub fn is_trustworthy(self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Value and validity from a single temperature request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub validity: Validity,
    pub value: Option<f32>,
}

impl SensorSample {
    /// The value, only when the gateway vouches for it.
    pub fn trusted_value(&self) -> Option<f32> {
        if self.validity.is_trustworthy() {
            self.value
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct DeviceClient {
    gateway: Arc<dyn Gateway>,
}

impl std::fmt::Debug for DeviceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceClient").finish_non_exhaustive()
    }
}

fn log_failure(op: &'static str, circuit: &str, e: &BoxError) {
    let fault = classify(&**e);
    tracing::warn!(op, circuit, %fault, error = %e, "gateway call failed");
}

impl DeviceClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Temperature value; `None` on any transport or decode failure.
    pub fn read_temperature(&self, circuit: &str) -> Option<f32> {
        match self.gateway.temperature(circuit) {
            Ok(p) => p.value,
            Err(e) => {
                log_failure("read_temperature", circuit, &e);
                None
            }
        }
    }

    pub fn probe_validity(&self, circuit: &str) -> Validity {
        self.sample(circuit).validity
    }

    /// `true` only when the gateway confirms the reading is trustworthy.
    pub fn read_sensor_validity(&self, circuit: &str) -> bool {
        self.probe_validity(circuit).is_trustworthy()
    }

    /// Value and validity from one request.
    pub fn sample(&self, circuit: &str) -> SensorSample {
        match self.gateway.temperature(circuit) {
            Ok(p) => SensorSample {
                validity: if p.valid {
                    Validity::Valid
                } else {
                    Validity::Invalid
                },
                value: p.value,
            },
            Err(e) => {
                log_failure("read_sensor", circuit, &e);
                SensorSample {
                    validity: Validity::Unknown,
                    value: None,
                }
            }
        }
    }

    pub fn read_digital_input(&self, circuit: &str) -> Option<bool> {
        self.gateway
            .digital_input(circuit)
            .inspect_err(|e| log_failure("read_digital_input", circuit, e))
            .ok()
    }

    /// Physical relay state; diagnostic and reconciliation only.
    pub fn read_relay_state(&self, circuit: &str) -> Option<bool> {
        self.gateway
            .relay(circuit)
            .inspect_err(|e| log_failure("read_relay_state", circuit, e))
            .ok()
    }

    /// Drive a relay or valve output. `true` once the gateway confirmed the write.
    #[must_use]
    pub fn write_relay(&self, circuit: &str, on: bool) -> bool {
        match self.gateway.set_relay(circuit, on) {
            Ok(()) => true,
            Err(e) => {
                log_failure("write_relay", circuit, &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferment_gateway::SimulatedGateway;

    #[test]
    fn failures_degrade_to_sentinels() {
        let gw = Arc::new(SimulatedGateway::new());
        gw.take_offline("28A1");
        gw.take_offline("1_01");
        gw.take_offline("2_01");
        let client = DeviceClient::new(gw);

        assert_eq!(client.read_temperature("28A1"), None);
        assert_eq!(client.probe_validity("28A1"), Validity::Unknown);
        assert!(!client.read_sensor_validity("28A1"));
        assert_eq!(client.read_digital_input("1_01"), None);
        assert_eq!(client.read_relay_state("2_01"), None);
        assert!(!client.write_relay("2_01", true));
    }

    #[test]
    fn confirmed_false_is_not_absent() {
        let gw = Arc::new(SimulatedGateway::new());
        gw.set_input("1_01", false);
        let client = DeviceClient::new(gw.clone());
        assert_eq!(client.read_digital_input("1_01"), Some(false));
        assert!(client.write_relay("2_01", true));
        assert_eq!(client.read_relay_state("2_01"), Some(true));
    }

    #[test]
    fn lost_sensor_is_invalid_not_unknown() {
        let gw = Arc::new(SimulatedGateway::new());
        gw.set_lost("28A1");
        let client = DeviceClient::new(gw);
        let s = client.sample("28A1");
        assert_eq!(s.validity, Validity::Invalid);
        assert_eq!(s.trusted_value(), None);
    }
}
