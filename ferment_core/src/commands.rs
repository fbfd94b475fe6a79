//! Operator commands, independent of the cycle.
//!
//! Each is a single-entity mutation plus at most one physical write. They
//! race with an in-progress cycle the same way any store writer does.

use std::sync::Arc;

use ferment_traits::Clock;

use crate::alarm;
use crate::client::DeviceClient;
use crate::error::{CoreError, EntityKind};
use crate::events;
use crate::model::LogRecord;
use crate::status::{self, SystemStatus};
use crate::store::StateStore;

#[derive(Clone)]
pub struct ManualControl {
    client: DeviceClient,
    store: Arc<dyn StateStore>,
    alarm_relay: String,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for ManualControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualControl")
            .field("alarm_relay", &self.alarm_relay)
            .finish_non_exhaustive()
    }
}

impl ManualControl {
    pub(crate) fn new(
        client: DeviceClient,
        store: Arc<dyn StateStore>,
        alarm_relay: String,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            client,
            store,
            alarm_relay,
            clock,
        }
    }

    pub fn set_target_temperature(&self, tank: &str, celsius: f32) -> Result<(), CoreError> {
        if !celsius.is_finite() {
            return Err(CoreError::InvalidCommand(format!(
                "target temperature must be finite, got {celsius}"
            )));
        }
        if self.store.tank(tank).is_none() {
            return Err(CoreError::unknown(EntityKind::Tank, tank));
        }
        self.store
            .update_tank(tank, &mut |t| t.target_temperature = celsius)?;
        events::record(
            self.store.as_ref(),
            LogRecord::new(
                self.clock.utc(),
                format!("Target temperature of tank {tank} set to {celsius:.1} °C"),
            )
            .tank(tank),
        );
        Ok(())
    }

    /// Open or close a valve now. The next regulation pass may reverse it.
    pub fn control_valve(&self, valve: &str, open: bool) -> Result<(), CoreError> {
        let v = self
            .store
            .valve(valve)
            .ok_or_else(|| CoreError::unknown(EntityKind::Valve, valve))?;
        if !self.client.write_relay(&v.circuit, open) {
            return Err(CoreError::WriteFailed { circuit: v.circuit });
        }
        let now = self.clock.utc();
        self.store.update_valve(valve, &mut |v| {
            v.is_open = open;
            v.last_updated = Some(now);
        })?;
        let verb = if open { "opened" } else { "closed" };
        events::record(
            self.store.as_ref(),
            LogRecord::new(now, format!("Valve {verb} manually: {valve}")).valve_state(open),
        );
        Ok(())
    }

    /// Drive a relay now. Mirrored and alarm relays are re-asserted next cycle.
    pub fn set_relay(&self, relay: &str, on: bool) -> Result<(), CoreError> {
        let r = self
            .store
            .relay(relay)
            .ok_or_else(|| CoreError::unknown(EntityKind::Relay, relay))?;
        if !self.client.write_relay(&r.circuit, on) {
            return Err(CoreError::WriteFailed { circuit: r.circuit });
        }
        let now = self.clock.utc();
        self.store.update_relay(relay, &mut |r| {
            r.is_active = on;
            r.last_updated = Some(now);
        })?;
        events::record(
            self.store.as_ref(),
            LogRecord::new(
                now,
                format!("Relay {relay} switched {} manually", if on { "on" } else { "off" }),
            ),
        );
        Ok(())
    }

    pub fn deactivate_alarm(&self) -> Result<(), CoreError> {
        alarm::deactivate(
            &self.client,
            self.store.as_ref(),
            &self.alarm_relay,
            self.clock.as_ref(),
        )
    }

    pub fn status(&self) -> SystemStatus {
        status::snapshot(self.store.as_ref(), &self.alarm_relay)
    }
}
