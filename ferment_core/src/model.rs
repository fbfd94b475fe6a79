//! Rig entities as held by the state store.
//!
//! Entities reference each other by name only. A tank whose sensor or valve
//! name no longer resolves is inert.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub name: String,
    pub circuit: String,
    /// Last trustworthy temperature (°C); `None` until the first good reading.
    pub current_temperature: Option<f32>,
    pub last_updated: Option<DateTime<Utc>>,
    pub min_temp: f32,
    pub max_temp: f32,
    /// Mirrors the fault tracker: true while the fault is persistent.
    pub error_active: bool,
    /// Start of the current run of invalid readings, if any.
    pub last_error_time: Option<DateTime<Utc>>,
}

impl Sensor {
    pub fn new(name: impl Into<String>, circuit: impl Into<String>, min_temp: f32, max_temp: f32) -> Self {
        Self {
            name: name.into(),
            circuit: circuit.into(),
            current_temperature: None,
            last_updated: None,
            min_temp,
            max_temp,
            error_active: false,
            last_error_time: None,
        }
    }

    /// The stored temperature when it lies outside `[min_temp, max_temp]`.
    pub fn out_of_range(&self) -> Option<f32> {
        self.current_temperature
            .filter(|t| *t < self.min_temp || *t > self.max_temp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tank {
    pub name: String,
    pub description: Option<String>,
    pub target_temperature: f32,
    pub sensor: Option<String>,
    pub valve: Option<String>,
}

impl Tank {
    pub fn new(name: impl Into<String>, target_temperature: f32) -> Self {
        Self {
            name: name.into(),
            description: None,
            target_temperature,
            sensor: None,
            valve: None,
        }
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    pub fn with_valve(mut self, valve: impl Into<String>) -> Self {
        self.valve = Some(valve.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valve {
    pub name: String,
    pub circuit: String,
    pub is_open: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Valve {
    pub fn new(name: impl Into<String>, circuit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            circuit: circuit.into(),
            is_open: false,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitalInput {
    pub name: String,
    pub circuit: String,
    pub state: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DigitalInput {
    pub fn new(name: impl Into<String>, circuit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            circuit: circuit.into(),
            state: false,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relay {
    pub name: String,
    pub circuit: String,
    pub is_active: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Relay {
    pub fn new(name: impl Into<String>, circuit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            circuit: circuit.into(),
            is_active: false,
            last_updated: None,
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub tank: Option<String>,
    pub sensor: Option<String>,
    pub temperature: Option<f32>,
    pub valve_state: Option<bool>,
}

impl LogRecord {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
            tank: None,
            sensor: None,
            temperature: None,
            valve_state: None,
        }
    }

    pub fn tank(mut self, tank: &str) -> Self {
        self.tank = Some(tank.to_string());
        self
    }

    pub fn sensor(mut self, sensor: &str) -> Self {
        self.sensor = Some(sensor.to_string());
        self
    }

    pub fn temperature(mut self, celsius: f32) -> Self {
        self.temperature = Some(celsius);
        self
    }

    pub fn valve_state(mut self, open: bool) -> Self {
        self.valve_state = Some(open);
        self
    }
}
