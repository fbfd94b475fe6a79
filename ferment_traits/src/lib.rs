//! Seams between the control loop and the outside world.
//!
//! `Gateway` is the raw sensor/actuator gateway capability. Implementations
//! report failures as boxed errors; the core decides how to degrade them.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type carried across the gateway trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One temperature sample as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempPoint {
    /// Reported value in °C, if the gateway included one.
    pub value: Option<f32>,
    /// Whether the gateway vouches for the value (not lost / valid).
    pub valid: bool,
}

impl TempPoint {
    pub fn valid(value: f32) -> Self {
        Self {
            value: Some(value),
            valid: true,
        }
    }

    pub fn lost() -> Self {
        Self {
            value: None,
            valid: false,
        }
    }
}

/// Request/response access to the sensor/actuator gateway.
///
/// Relays and valves share the binary-output calls. Methods take `&self`
/// so one gateway can serve the cycle driver and manual commands at once.
pub trait Gateway: Send + Sync {
    fn temperature(&self, circuit: &str) -> Result<TempPoint, BoxError>;
    fn digital_input(&self, circuit: &str) -> Result<bool, BoxError>;
    fn relay(&self, circuit: &str) -> Result<bool, BoxError>;
    fn set_relay(&self, circuit: &str, on: bool) -> Result<(), BoxError>;
}
