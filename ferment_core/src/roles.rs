//! Well-known entities resolved once at startup.

use crate::config::{MirrorPair, RoleNames};
use crate::error::{CoreError, EntityKind};
use crate::store::StateStore;

/// Role names that were present in the store when the controller was built.
///
/// Entities can still disappear later; each step re-checks and fails that
/// step alone with `CoreError::MissingEntity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles {
    alarm_relay: String,
    estop_input: String,
    mirrors: Vec<MirrorPair>,
}

impl Roles {
    pub fn resolve(names: &RoleNames, store: &dyn StateStore) -> Result<Self, CoreError> {
        if store.relay(&names.alarm_relay).is_none() {
            return Err(CoreError::missing(EntityKind::Relay, &names.alarm_relay));
        }
        if store.input(&names.estop_input).is_none() {
            return Err(CoreError::missing(EntityKind::Input, &names.estop_input));
        }
        for m in &names.mirrors {
            if store.input(&m.input).is_none() {
                return Err(CoreError::missing(EntityKind::Input, &m.input));
            }
            if store.relay(&m.relay).is_none() {
                return Err(CoreError::missing(EntityKind::Relay, &m.relay));
            }
        }
        Ok(Self {
            alarm_relay: names.alarm_relay.clone(),
            estop_input: names.estop_input.clone(),
            mirrors: names.mirrors.clone(),
        })
    }

    pub fn alarm_relay(&self) -> &str {
        &self.alarm_relay
    }

    pub fn estop_input(&self) -> &str {
        &self.estop_input
    }

    pub fn mirrors(&self) -> &[MirrorPair] {
        &self.mirrors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DigitalInput, Relay};
    use crate::store::MemoryStore;

    fn rig() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_relay(Relay::new("Alarm_Relay", "2_08"));
        store.insert_relay(Relay::new("Pump_Relay", "2_02"));
        store.insert_relay(Relay::new("Chiller_Relay", "2_03"));
        store.insert_input(DigitalInput::new("Total_Stop_DI", "1_01"));
        store.insert_input(DigitalInput::new("Pump_DI", "1_02"));
        store.insert_input(DigitalInput::new("Chiller_DI", "1_03"));
        store
    }

    #[test]
    fn resolves_default_names() {
        let store = rig();
        let roles = Roles::resolve(&RoleNames::default(), &store).expect("resolve");
        assert_eq!(roles.alarm_relay(), "Alarm_Relay");
        assert_eq!(roles.mirrors().len(), 2);
    }

    #[test]
    fn missing_alarm_relay_fails_fast() {
        let store = rig();
        store.remove_relay("Alarm_Relay");
        let err = Roles::resolve(&RoleNames::default(), &store).expect_err("missing");
        assert_eq!(err, CoreError::missing(EntityKind::Relay, "Alarm_Relay"));
    }

    #[test]
    fn missing_mirror_input_fails_fast() {
        let store = rig();
        store.remove_input("Chiller_DI");
        let err = Roles::resolve(&RoleNames::default(), &store).expect_err("missing");
        assert!(err.to_string().contains("Chiller_DI"));
    }
}
