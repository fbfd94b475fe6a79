use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use ferment_traits::{Clock, Gateway, MonotonicClock};

use crate::client::DeviceClient;
use crate::config::{DEFAULT_PERSIST_AFTER, RoleNames};
use crate::controller::Controller;
use crate::error::{BuildError, Result};
use crate::fault::FaultTracker;
use crate::roles::Roles;
use crate::store::StateStore;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for [`Controller`]. Role names are resolved against the store on build.
pub struct ControllerBuilder<G, S> {
    gateway: Option<Arc<dyn Gateway>>,
    store: Option<Arc<dyn StateStore>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    roles: Option<RoleNames>,
    persist_after: Option<Duration>,
    _g: PhantomData<G>,
    _s: PhantomData<S>,
}

impl Default for ControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            gateway: None,
            store: None,
            clock: None,
            roles: None,
            persist_after: None,
            _g: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<G, S> ControllerBuilder<G, S> {
    /// Fallible build available in any type-state; reports the missing piece.
    pub fn try_build(self) -> Result<Controller> {
        let gateway = self
            .gateway
            .ok_or_else(|| eyre::Report::new(BuildError::MissingGateway))?;
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;
        let persist_after = self.persist_after.unwrap_or(DEFAULT_PERSIST_AFTER);
        if persist_after.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "fault persistence window must be > 0",
            )));
        }
        let roles = Roles::resolve(&self.roles.unwrap_or_default(), store.as_ref())?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()) as Arc<dyn Clock + Send + Sync>);

        tracing::debug!(
            alarm_relay = roles.alarm_relay(),
            estop_input = roles.estop_input(),
            mirrors = roles.mirrors().len(),
            persist_after_s = persist_after.as_secs(),
            "controller built"
        );
        Ok(Controller::from_parts(
            DeviceClient::new(gateway),
            store,
            FaultTracker::new(persist_after),
            roles,
            clock,
        ))
    }
}

/// Chainable setters that do not affect type-state.
impl<G, S> ControllerBuilder<G, S> {
    pub fn with_roles(mut self, roles: RoleNames) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_persist_after(mut self, d: Duration) -> Self {
        self.persist_after = Some(d);
        self
    }

    /// Defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<S> ControllerBuilder<Missing, S> {
    pub fn with_gateway(self, gateway: Arc<dyn Gateway>) -> ControllerBuilder<Set, S> {
        ControllerBuilder {
            gateway: Some(gateway),
            store: self.store,
            clock: self.clock,
            roles: self.roles,
            persist_after: self.persist_after,
            _g: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<G> ControllerBuilder<G, Missing> {
    pub fn with_store(self, store: Arc<dyn StateStore>) -> ControllerBuilder<G, Set> {
        ControllerBuilder {
            gateway: self.gateway,
            store: Some(store),
            clock: self.clock,
            roles: self.roles,
            persist_after: self.persist_after,
            _g: PhantomData,
            _s: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set> {
    /// Only available once the gateway and the store are set.
    pub fn build(self) -> Result<Controller> {
        self.try_build()
    }
}
