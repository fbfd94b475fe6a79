//! Bang-bang valve regulation per tank, followed by the alarm aggregate.

use ferment_traits::Clock;
use serde::Serialize;

use crate::alarm::{self, AlarmOutcome};
use crate::client::DeviceClient;
use crate::error::CoreError;
use crate::events;
use crate::fault::FaultTracker;
use crate::model::{LogRecord, Tank};
use crate::roles::Roles;
use crate::store::StateStore;

/// Valve command derived from one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveAction {
    Open,
    Close,
    Hold,
}

/// Open to cool above target, close at or below it. No deadband.
pub fn decide(current: f32, target: f32, is_open: bool) -> ValveAction {
    if current > target && !is_open {
        ValveAction::Open
    } else if current <= target && is_open {
        ValveAction::Close
    } else {
        ValveAction::Hold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TankOutcome {
    Inert,
    SkippedFaulty,
    SkippedNoData,
    Opened,
    Closed,
    Held,
    WriteFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegulationSummary {
    pub opened: usize,
    pub closed: usize,
    pub held: usize,
    pub skipped_faulty: usize,
    pub skipped_no_data: usize,
    pub inert: usize,
    pub write_failures: usize,
    /// Tanks whose step failed on a store error.
    pub errors: usize,
    pub alarm: AlarmOutcome,
}

impl RegulationSummary {
    fn count(&mut self, o: TankOutcome) {
        match o {
            TankOutcome::Inert => self.inert += 1,
            TankOutcome::SkippedFaulty => self.skipped_faulty += 1,
            TankOutcome::SkippedNoData => self.skipped_no_data += 1,
            TankOutcome::Opened => self.opened += 1,
            TankOutcome::Closed => self.closed += 1,
            TankOutcome::Held => self.held += 1,
            TankOutcome::WriteFailed => self.write_failures += 1,
        }
    }
}

pub fn regulate(
    client: &DeviceClient,
    store: &dyn StateStore,
    faults: &FaultTracker,
    roles: &Roles,
    clock: &dyn Clock,
) -> Result<RegulationSummary, CoreError> {
    let mut summary = RegulationSummary::default();
    for tank in store.tanks() {
        match regulate_tank(client, store, faults, &tank, clock) {
            Ok(o) => summary.count(o),
            Err(e) => {
                tracing::error!(tank = %tank.name, error = %e, "regulation failed");
                summary.errors += 1;
            }
        }
    }
    summary.alarm = alarm::evaluate(
        client,
        store,
        faults,
        roles.alarm_relay(),
        roles.estop_input(),
        clock,
    )?;
    Ok(summary)
}

fn regulate_tank(
    client: &DeviceClient,
    store: &dyn StateStore,
    faults: &FaultTracker,
    tank: &Tank,
    clock: &dyn Clock,
) -> Result<TankOutcome, CoreError> {
    // Dangling references make the tank inert, same as unset ones.
    let (Some(sensor), Some(valve)) = (
        tank.sensor.as_deref().and_then(|n| store.sensor(n)),
        tank.valve.as_deref().and_then(|n| store.valve(n)),
    ) else {
        return Ok(TankOutcome::Inert);
    };

    if faults.is_persistent_fault(&sensor.name) {
        tracing::debug!(tank = %tank.name, sensor = %sensor.name, "skipping: sensor fault persistent");
        return Ok(TankOutcome::SkippedFaulty);
    }

    // A value the gateway flags as lost or invalid counts as no data; the
    // fault tracker debounces it, regulation and the alarm never see it.
    let sample = client.sample(&sensor.circuit);
    let Some(current) = sample.trusted_value() else {
        if sample.value.is_some() {
            tracing::debug!(tank = %tank.name, sensor = %sensor.name, validity = ?sample.validity, "untrusted reading ignored");
        }
        events::record(
            store,
            LogRecord::new(
                clock.utc(),
                format!("Failed to read temperature for sensor '{}'.", sensor.name),
            )
            .tank(&tank.name)
            .sensor(&sensor.name),
        );
        return Ok(TankOutcome::SkippedNoData);
    };

    let now = clock.utc();
    store.update_sensor(&sensor.name, &mut |s| {
        s.current_temperature = Some(current);
        s.last_updated = Some(now);
    })?;

    let is_open = match client.read_relay_state(&valve.circuit) {
        Some(physical) if physical != valve.is_open => {
            store.update_valve(&valve.name, &mut |v| {
                v.is_open = physical;
                v.last_updated = Some(now);
            })?;
            events::record(
                store,
                LogRecord::new(
                    now,
                    format!(
                        "Valve '{}' found {} by gateway, stored state corrected",
                        valve.name,
                        if physical { "open" } else { "closed" }
                    ),
                )
                .tank(&tank.name)
                .valve_state(physical),
            );
            physical
        }
        Some(physical) => physical,
        None => valve.is_open,
    };

    let open = match decide(current, tank.target_temperature, is_open) {
        ValveAction::Hold => return Ok(TankOutcome::Held),
        ValveAction::Open => true,
        ValveAction::Close => false,
    };

    if !client.write_relay(&valve.circuit, open) {
        tracing::error!(tank = %tank.name, valve = %valve.name, open, "valve write failed; stored state unchanged");
        return Ok(TankOutcome::WriteFailed);
    }
    let now = clock.utc();
    store.update_valve(&valve.name, &mut |v| {
        v.is_open = open;
        v.last_updated = Some(now);
    })?;

    let message = if open {
        format!(
            "Valve opened: {} (tank {} at {current:.1} °C, target {:.1} °C)",
            valve.name, tank.name, tank.target_temperature
        )
    } else {
        format!(
            "Valve closed: {} (tank {} at {current:.1} °C, target {:.1} °C)",
            valve.name, tank.name, tank.target_temperature
        )
    };
    events::record(
        store,
        LogRecord::new(now, message)
            .tank(&tank.name)
            .sensor(&sensor.name)
            .temperature(current)
            .valve_state(open),
    );
    Ok(if open {
        TankOutcome::Opened
    } else {
        TankOutcome::Closed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(22.0, 20.0, false, ValveAction::Open)]
    #[case(22.0, 20.0, true, ValveAction::Hold)]
    #[case(20.0, 20.0, true, ValveAction::Close)]
    #[case(20.0, 20.0, false, ValveAction::Hold)]
    #[case(18.5, 20.0, true, ValveAction::Close)]
    #[case(20.01, 20.0, false, ValveAction::Open)]
    fn bang_bang(
        #[case] current: f32,
        #[case] target: f32,
        #[case] is_open: bool,
        #[case] expected: ValveAction,
    ) {
        assert_eq!(decide(current, target, is_open), expected);
    }
}
