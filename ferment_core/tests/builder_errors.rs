mod common;

use std::sync::Arc;
use std::time::Duration;

use common::populated_store;
use ferment_core::mocks::OfflineGateway;
use ferment_core::{BuildError, Controller, CoreError, EntityKind, MirrorPair, RoleNames};
use ferment_gateway::SimulatedGateway;

#[test]
fn missing_gateway_is_reported() {
    let err = Controller::builder()
        .with_store(Arc::new(populated_store()))
        .try_build()
        .expect_err("no gateway");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingGateway)
    ));
}

#[test]
fn missing_store_is_reported() {
    let err = Controller::builder()
        .with_gateway(Arc::new(SimulatedGateway::new()))
        .try_build()
        .expect_err("no store");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingStore)
    ));
}

#[test]
fn zero_persistence_window_is_rejected() {
    let err = Controller::builder()
        .with_gateway(Arc::new(SimulatedGateway::new()))
        .with_store(Arc::new(populated_store()))
        .with_persist_after(Duration::ZERO)
        .build()
        .expect_err("zero window");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn missing_alarm_relay_fails_fast() {
    let store = populated_store();
    store.remove_relay("Alarm_Relay");
    let err = Controller::builder()
        .with_gateway(Arc::new(SimulatedGateway::new()))
        .with_store(Arc::new(store))
        .build()
        .expect_err("alarm relay missing");
    assert_eq!(
        err.downcast_ref::<CoreError>(),
        Some(&CoreError::MissingEntity {
            kind: EntityKind::Relay,
            name: "Alarm_Relay".into()
        })
    );
    assert!(err.to_string().contains("Alarm_Relay"));
}

#[test]
fn custom_role_names_are_resolved() {
    let store = populated_store();
    let roles = RoleNames {
        alarm_relay: "Pump_Relay".into(),
        estop_input: "Chiller_DI".into(),
        mirrors: vec![MirrorPair::new("Pump_DI", "Chiller_Relay")],
    };
    let controller = Controller::builder()
        .with_gateway(Arc::new(SimulatedGateway::new()))
        .with_store(Arc::new(store))
        .with_roles(roles)
        .build()
        .expect("build");
    assert_eq!(controller.roles().alarm_relay(), "Pump_Relay");
    assert_eq!(controller.roles().mirrors().len(), 1);
}

#[test]
fn offline_gateway_never_panics_a_cycle() {
    let mut controller = Controller::builder()
        .with_gateway(Arc::new(OfflineGateway))
        .with_store(Arc::new(populated_store()))
        .build()
        .expect("build");
    let report = controller.cycle();
    assert_eq!(report.failed_steps(), 0);
    let sync = report.sync.expect("sync");
    assert!(!sync.interlocked());
    let reg = report.regulation.expect("regulation");
    assert_eq!(reg.skipped_no_data, 1);
    assert!(!reg.alarm.write_confirmed);
}
