//! Digital input refresh, emergency-stop interlock, mirrored relay pairs.

use ferment_traits::Clock;
use serde::Serialize;

use crate::client::DeviceClient;
use crate::error::{CoreError, EntityKind};
use crate::events;
use crate::model::LogRecord;
use crate::roles::Roles;
use crate::store::StateStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Emergency stop active; every relay was driven off.
    Interlocked { forced_off: usize, failed: usize },
    Mirrored {
        mirrored: usize,
        failed: usize,
        /// Inputs whose read failed this cycle; their stored value was used.
        stale_inputs: usize,
    },
}

impl SyncOutcome {
    pub fn interlocked(&self) -> bool {
        matches!(self, SyncOutcome::Interlocked { .. })
    }
}

/// Write `on` to a relay and store it once confirmed.
fn drive_relay(
    client: &DeviceClient,
    store: &dyn StateStore,
    name: &str,
    circuit: &str,
    on: bool,
    clock: &dyn Clock,
) -> Result<bool, CoreError> {
    if !client.write_relay(circuit, on) {
        return Ok(false);
    }
    let now = clock.utc();
    store.update_relay(name, &mut |r| {
        r.is_active = on;
        r.last_updated = Some(now);
    })?;
    Ok(true)
}

pub fn sync_inputs_and_relays(
    client: &DeviceClient,
    store: &dyn StateStore,
    roles: &Roles,
    clock: &dyn Clock,
) -> Result<SyncOutcome, CoreError> {
    let mut stale_inputs = 0;
    for input in store.inputs() {
        match client.read_digital_input(&input.circuit) {
            Some(state) => {
                let now = clock.utc();
                store.update_input(&input.name, &mut |i| {
                    i.state = state;
                    i.last_updated = Some(now);
                })?;
            }
            None => {
                tracing::warn!(input = %input.name, "digital input unreadable, keeping stored state");
                stale_inputs += 1;
            }
        }
    }

    let estop = store
        .input(roles.estop_input())
        .ok_or_else(|| CoreError::missing(EntityKind::Input, roles.estop_input()))?;

    if estop.state {
        let relays = store.relays();
        let was_active: Vec<&str> = relays
            .iter()
            .filter(|r| r.is_active)
            .map(|r| r.name.as_str())
            .collect();
        let mut forced_off = 0;
        let mut failed = 0;
        for r in &relays {
            if drive_relay(client, store, &r.name, &r.circuit, false, clock)? {
                forced_off += 1;
            } else {
                failed += 1;
            }
        }
        if !was_active.is_empty() {
            tracing::warn!(input = roles.estop_input(), relays = ?was_active, "emergency stop: relays forced off");
            events::record(
                store,
                LogRecord::new(
                    clock.utc(),
                    format!("Emergency stop active, relays forced off: {}", was_active.join(", ")),
                ),
            );
        }
        if failed > 0 {
            tracing::error!(failed, "emergency stop: some relays did not confirm OFF");
        }
        return Ok(SyncOutcome::Interlocked { forced_off, failed });
    }

    let mut mirrored = 0;
    let mut failed = 0;
    for pair in roles.mirrors() {
        let input = store
            .input(&pair.input)
            .ok_or_else(|| CoreError::missing(EntityKind::Input, &pair.input))?;
        let relay = store
            .relay(&pair.relay)
            .ok_or_else(|| CoreError::missing(EntityKind::Relay, &pair.relay))?;
        if drive_relay(client, store, &relay.name, &relay.circuit, input.state, clock)? {
            mirrored += 1;
        } else {
            failed += 1;
        }
    }
    Ok(SyncOutcome::Mirrored {
        mirrored,
        failed,
        stale_inputs,
    })
}
