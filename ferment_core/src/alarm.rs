//! Alarm coordination.
//!
//! Level-triggered: the aggregate is recomputed from scratch every cycle and
//! the alarm relay is written ON or OFF every time. While the emergency-stop
//! input is stored as active the relay is held OFF, so it never re-energizes
//! after the interlock forced it off.

use ferment_traits::Clock;
use serde::Serialize;

use crate::client::DeviceClient;
use crate::error::{CoreError, EntityKind};
use crate::events;
use crate::fault::FaultTracker;
use crate::model::{LogRecord, Sensor};
use crate::store::StateStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlarmOutcome {
    /// An alarm condition holds.
    pub active: bool,
    pub reasons: Vec<String>,
    /// The emergency stop held the relay off despite `active`.
    pub interlocked: bool,
    /// The gateway confirmed the relay write this cycle.
    pub write_confirmed: bool,
}

/// Why `sensor` contributes to the alarm, if it does.
pub fn sensor_reasons(sensor: &Sensor, faults: &FaultTracker) -> Vec<String> {
    let mut out = Vec::new();
    if faults.is_persistent_fault(&sensor.name) {
        out.push(format!("Sensor '{}' faulty", sensor.name));
    }
    if let Some(t) = sensor.out_of_range() {
        out.push(format!(
            "Sensor '{}' out of range: {t:.1} °C not in [{:.1}, {:.1}]",
            sensor.name, sensor.min_temp, sensor.max_temp
        ));
    }
    out
}

/// True while the emergency-stop input is stored as active. A missing input
/// does not silence the alarm.
fn interlock_engaged(store: &dyn StateStore, estop_input: &str) -> bool {
    store.input(estop_input).is_some_and(|i| i.state)
}

pub fn evaluate(
    client: &DeviceClient,
    store: &dyn StateStore,
    faults: &FaultTracker,
    alarm_relay: &str,
    estop_input: &str,
    clock: &dyn Clock,
) -> Result<AlarmOutcome, CoreError> {
    let relay = store
        .relay(alarm_relay)
        .ok_or_else(|| CoreError::missing(EntityKind::Relay, alarm_relay))?;

    let reasons: Vec<String> = store
        .sensors()
        .iter()
        .flat_map(|s| sensor_reasons(s, faults))
        .collect();
    let active = !reasons.is_empty();
    let interlocked = active && interlock_engaged(store, estop_input);
    let energize = active && !interlocked;

    let write_confirmed = client.write_relay(&relay.circuit, energize);
    let now = clock.utc();
    if write_confirmed {
        store.update_relay(alarm_relay, &mut |r| {
            r.is_active = energize;
            r.last_updated = Some(now);
        })?;
    } else {
        tracing::error!(relay = alarm_relay, energize, "alarm relay write failed");
    }

    let message = if interlocked {
        format!("Alarm held off by emergency stop: {}", reasons.join("; "))
    } else if active {
        format!("Alarm triggered: {}", reasons.join("; "))
    } else {
        "Alarm cleared".to_string()
    };
    let rec = LogRecord::new(now, message);
    if relay.is_active == energize {
        events::record_repeat(store, rec);
    } else {
        if energize {
            tracing::warn!(relay = alarm_relay, reasons = reasons.len(), "alarm raised");
        }
        events::record(store, rec);
    }

    Ok(AlarmOutcome {
        active,
        reasons,
        interlocked,
        write_confirmed,
    })
}

/// Manual override: relay OFF and flag cleared right away.
///
/// The next cycle re-evaluates and may switch it back on.
pub fn deactivate(
    client: &DeviceClient,
    store: &dyn StateStore,
    alarm_relay: &str,
    clock: &dyn Clock,
) -> Result<(), CoreError> {
    let relay = store
        .relay(alarm_relay)
        .ok_or_else(|| CoreError::missing(EntityKind::Relay, alarm_relay))?;
    if !client.write_relay(&relay.circuit, false) {
        return Err(CoreError::WriteFailed {
            circuit: relay.circuit,
        });
    }
    let now = clock.utc();
    store.update_relay(alarm_relay, &mut |r| {
        r.is_active = false;
        r.last_updated = Some(now);
    })?;
    events::record(store, LogRecord::new(now, "Alarm manually deactivated"));
    Ok(())
}
