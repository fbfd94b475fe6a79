//! Runtime configuration for the control loop.
//!
//! Separate from the TOML schema in `ferment_config`; see `conversions`.

use std::time::Duration;

/// Default persistence window for sensor faults.
pub const DEFAULT_PERSIST_AFTER: Duration = Duration::from_secs(60);

/// Timing of the cycle driver and fault tracker.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    /// Pause between cycles.
    pub interval: Duration,
    /// Continuous invalidity after which a sensor fault is persistent.
    pub persist_after: Duration,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            persist_after: DEFAULT_PERSIST_AFTER,
        }
    }
}

/// An input whose state is copied onto a relay every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPair {
    pub input: String,
    pub relay: String,
}

impl MirrorPair {
    pub fn new(input: impl Into<String>, relay: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            relay: relay.into(),
        }
    }
}

/// Names of the well-known entities, before they are checked against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNames {
    pub alarm_relay: String,
    pub estop_input: String,
    pub mirrors: Vec<MirrorPair>,
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            alarm_relay: "Alarm_Relay".to_string(),
            estop_input: "Total_Stop_DI".to_string(),
            mirrors: vec![
                MirrorPair::new("Pump_DI", "Pump_Relay"),
                MirrorPair::new("Chiller_DI", "Chiller_Relay"),
            ],
        }
    }
}
