#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the fermentation rig controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Entity tables (`[[sensors]]`, `[[tanks]]`, ...) seed the state store;
//!   `[roles]` names the well-known entities the control loop depends on.
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_BASE_URL: &str = "http://192.168.2.77:8080/json";

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayFlavor {
    /// `/temp/{circuit}` with a `lost` flag
    #[default]
    Temp,
    /// `/data_point/{circuit}` with a `valid` flag
    DataPoint,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewayCfg {
    pub base_url: String,
    /// Transport timeout per request (ms)
    pub timeout_ms: u64,
    pub flavor: GatewayFlavor,
}

impl Default for GatewayCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 2000,
            flavor: GatewayFlavor::Temp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CycleCfg {
    /// Pause between control cycles (ms)
    pub interval_ms: u64,
}

impl Default for CycleCfg {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FaultCfg {
    /// Continuous invalidity (s) after which a sensor fault is persistent
    pub persist_after_s: u64,
}

impl Default for FaultCfg {
    fn default() -> Self {
        Self { persist_after_s: 60 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
    /// Audit records kept in memory for the recent-log view. The alarm
    /// outcome is recorded every cycle, so this bounds history to roughly
    /// `history * cycle.interval_ms`. Default 10 000.
    pub history: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MirrorCfg {
    pub input: String,
    pub relay: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RolesCfg {
    pub alarm_relay: String,
    pub estop_input: String,
    /// Inputs whose state is copied onto relays every cycle
    pub mirrors: Vec<MirrorCfg>,
}

impl Default for RolesCfg {
    fn default() -> Self {
        Self {
            alarm_relay: "Alarm_Relay".to_string(),
            estop_input: "Total_Stop_DI".to_string(),
            mirrors: vec![
                MirrorCfg {
                    input: "Pump_DI".to_string(),
                    relay: "Pump_Relay".to_string(),
                },
                MirrorCfg {
                    input: "Chiller_DI".to_string(),
                    relay: "Chiller_Relay".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorCfg {
    pub name: String,
    /// 1-Wire address or gateway circuit id
    pub circuit: String,
    #[serde(default)]
    pub min_temp: f32,
    #[serde(default = "default_max_temp")]
    pub max_temp: f32,
}

fn default_max_temp() -> f32 {
    25.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelCfg {
    pub name: String,
    pub circuit: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TankCfg {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_temperature: f32,
    #[serde(default)]
    pub sensor: Option<String>,
    #[serde(default)]
    pub valve: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayCfg,
    #[serde(default)]
    pub cycle: CycleCfg,
    #[serde(default)]
    pub faults: FaultCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub roles: RolesCfg,
    #[serde(default)]
    pub sensors: Vec<SensorCfg>,
    #[serde(default)]
    pub valves: Vec<ChannelCfg>,
    #[serde(default)]
    pub tanks: Vec<TankCfg>,
    #[serde(default)]
    pub inputs: Vec<ChannelCfg>,
    #[serde(default)]
    pub relays: Vec<ChannelCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn ensure_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> eyre::Result<()> {
    let mut seen = HashSet::new();
    for n in names {
        if n.trim().is_empty() {
            eyre::bail!("{kind} entry has an empty name");
        }
        if !seen.insert(n) {
            eyre::bail!("duplicate {kind} name '{n}'");
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Gateway
        let url = self.gateway.base_url.trim();
        if url.is_empty() {
            eyre::bail!("gateway.base_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            eyre::bail!("gateway.base_url must start with http:// or https://");
        }
        if self.gateway.timeout_ms == 0 {
            eyre::bail!("gateway.timeout_ms must be >= 1");
        }

        // Cycle / faults
        if self.cycle.interval_ms == 0 {
            eyre::bail!("cycle.interval_ms must be >= 1");
        }
        if self.cycle.interval_ms > 60 * 60 * 1000 {
            eyre::bail!("cycle.interval_ms is unreasonably large (>1h)");
        }
        if self.faults.persist_after_s == 0 {
            eyre::bail!("faults.persist_after_s must be >= 1");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{r}'");
        }
        if self.logging.history == Some(0) {
            eyre::bail!("logging.history must be >= 1");
        }

        // Entities
        ensure_unique("sensor", self.sensors.iter().map(|s| s.name.as_str()))?;
        ensure_unique("valve", self.valves.iter().map(|v| v.name.as_str()))?;
        ensure_unique("tank", self.tanks.iter().map(|t| t.name.as_str()))?;
        ensure_unique("input", self.inputs.iter().map(|i| i.name.as_str()))?;
        ensure_unique("relay", self.relays.iter().map(|r| r.name.as_str()))?;

        for s in &self.sensors {
            if s.circuit.trim().is_empty() {
                eyre::bail!("sensor '{}' has an empty circuit", s.name);
            }
            if !s.min_temp.is_finite() || !s.max_temp.is_finite() {
                eyre::bail!("sensor '{}' range must be finite", s.name);
            }
            if s.min_temp > s.max_temp {
                eyre::bail!(
                    "sensor '{}' min_temp ({}) must be <= max_temp ({})",
                    s.name,
                    s.min_temp,
                    s.max_temp
                );
            }
        }
        for c in self.valves.iter().chain(&self.inputs).chain(&self.relays) {
            if c.circuit.trim().is_empty() {
                eyre::bail!("'{}' has an empty circuit", c.name);
            }
        }
        for t in &self.tanks {
            if !t.target_temperature.is_finite() {
                eyre::bail!("tank '{}' target_temperature must be finite", t.name);
            }
            if let Some(s) = t.sensor.as_deref()
                && !self.sensors.iter().any(|x| x.name == s)
            {
                eyre::bail!("tank '{}' references unknown sensor '{s}'", t.name);
            }
            if let Some(v) = t.valve.as_deref()
                && !self.valves.iter().any(|x| x.name == v)
            {
                eyre::bail!("tank '{}' references unknown valve '{v}'", t.name);
            }
        }

        // Roles: presence in the store is checked when the controller is built
        if self.roles.alarm_relay.trim().is_empty() {
            eyre::bail!("roles.alarm_relay must not be empty");
        }
        if self.roles.estop_input.trim().is_empty() {
            eyre::bail!("roles.estop_input must not be empty");
        }

        Ok(())
    }
}
