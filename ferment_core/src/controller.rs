//! The controller: owns the fault tracker and runs one cycle at a time.

use std::sync::Arc;

use ferment_traits::Clock;

use crate::alarm::{self, AlarmOutcome};
use crate::builder::{ControllerBuilder, Missing};
use crate::client::DeviceClient;
use crate::commands::ManualControl;
use crate::error::CoreError;
use crate::fault::FaultTracker;
use crate::regulate::{self, RegulationSummary};
use crate::roles::Roles;
use crate::sensors::{self, SensorSweep};
use crate::status::{self, CycleReport, SystemStatus};
use crate::store::StateStore;
use crate::sync::{self, SyncOutcome};

pub struct Controller {
    client: DeviceClient,
    store: Arc<dyn StateStore>,
    faults: FaultTracker,
    roles: Roles,
    clock: Arc<dyn Clock + Send + Sync>,
    cycles: u64,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("roles", &self.roles)
            .field("faults", &self.faults)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn builder() -> ControllerBuilder<Missing, Missing> {
        ControllerBuilder::default()
    }

    pub(crate) fn from_parts(
        client: DeviceClient,
        store: Arc<dyn StateStore>,
        faults: FaultTracker,
        roles: Roles,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            client,
            store,
            faults,
            roles,
            clock,
            cycles: 0,
        }
    }

    pub fn refresh_sensors(&mut self) -> Result<SensorSweep, CoreError> {
        sensors::refresh(
            &self.client,
            self.store.as_ref(),
            &mut self.faults,
            self.clock.as_ref(),
        )
    }

    pub fn sync_inputs_and_relays(&self) -> Result<SyncOutcome, CoreError> {
        sync::sync_inputs_and_relays(
            &self.client,
            self.store.as_ref(),
            &self.roles,
            self.clock.as_ref(),
        )
    }

    /// Regulates every tank, then re-runs the alarm aggregate.
    pub fn regulate_temperature(&self) -> Result<RegulationSummary, CoreError> {
        regulate::regulate(
            &self.client,
            self.store.as_ref(),
            &self.faults,
            &self.roles,
            self.clock.as_ref(),
        )
    }

    pub fn check_alarms(&self) -> Result<AlarmOutcome, CoreError> {
        alarm::evaluate(
            &self.client,
            self.store.as_ref(),
            &self.faults,
            self.roles.alarm_relay(),
            self.roles.estop_input(),
            self.clock.as_ref(),
        )
    }

    /// One full pass. Each step runs even if an earlier one failed.
    pub fn cycle(&mut self) -> CycleReport {
        let t0 = self.clock.now();
        self.cycles += 1;
        let cycle = self.cycles;

        let sensors = self.refresh_sensors();
        let sync = self.sync_inputs_and_relays();
        let regulation = self.regulate_temperature();

        let report = CycleReport {
            cycle,
            sensors,
            sync,
            regulation,
            elapsed: self.clock.now().saturating_duration_since(t0),
        };
        for e in report.errors() {
            tracing::error!(cycle, error = %e, "cycle step failed");
        }
        tracing::trace!(
            cycle,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            alarm = ?report.alarm_active(),
            "cycle complete"
        );
        report
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn faults(&self) -> &FaultTracker {
        &self.faults
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        self.clock.as_ref()
    }

    pub fn status(&self) -> SystemStatus {
        status::snapshot(self.store.as_ref(), self.roles.alarm_relay())
    }

    /// Handle for operator commands; usable from another thread.
    pub fn manual(&self) -> ManualControl {
        ManualControl::new(
            self.client.clone(),
            Arc::clone(&self.store),
            self.roles.alarm_relay().to_string(),
            Arc::clone(&self.clock),
        )
    }
}
