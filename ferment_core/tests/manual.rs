mod common;

use std::thread;

use common::*;
use ferment_core::{CoreError, EntityKind, StateStore};

#[test]
fn manual_deactivate_is_overridden_next_cycle() {
    let mut rig = rig();
    rig.gw.set_temperature(SENSOR_CIRCUIT, 30.0);
    rig.controller.cycle();
    assert!(rig.store.relay("Alarm_Relay").expect("relay").is_active);

    let manual = rig.controller.manual();
    manual.deactivate_alarm().expect("deactivate");
    assert!(!rig.store.relay("Alarm_Relay").expect("relay").is_active);
    assert_eq!(rig.gw.relay_state(ALARM_CIRCUIT), Some(false));
    assert!(!manual.status().alarm_active);

    let report = rig.controller.cycle();
    assert_eq!(report.alarm_active(), Some(true));
    assert!(rig.store.relay("Alarm_Relay").expect("relay").is_active);
}

#[test]
fn new_target_takes_effect_next_cycle() {
    let mut rig = rig();
    rig.gw.set_temperature(SENSOR_CIRCUIT, 19.0);
    rig.controller.cycle();
    assert!(rig.gw.writes_to(VALVE_CIRCUIT).is_empty());

    rig.controller
        .manual()
        .set_target_temperature("T1", 18.0)
        .expect("set target");
    assert_eq!(
        rig.store.tank("T1").expect("tank").target_temperature,
        18.0
    );
    rig.controller.cycle();
    assert_eq!(rig.gw.writes_to(VALVE_CIRCUIT), vec![true]);
}

#[test]
fn bad_commands_are_rejected() {
    let rig = rig();
    let manual = rig.controller.manual();
    assert_eq!(
        manual.set_target_temperature("T9", 18.0),
        Err(CoreError::UnknownEntity {
            kind: EntityKind::Tank,
            name: "T9".into()
        })
    );
    assert!(matches!(
        manual.set_target_temperature("T1", f32::NAN),
        Err(CoreError::InvalidCommand(_))
    ));
    assert!(matches!(
        manual.control_valve("V9", true),
        Err(CoreError::UnknownEntity { .. })
    ));
}

#[test]
fn manual_valve_write_failure_keeps_state() {
    let rig = rig();
    rig.gw.reject_writes(VALVE_CIRCUIT);
    let err = rig
        .controller
        .manual()
        .control_valve("V1", true)
        .expect_err("write rejected");
    assert_eq!(
        err,
        CoreError::WriteFailed {
            circuit: VALVE_CIRCUIT.into()
        }
    );
    assert!(!rig.store.valve("V1").expect("valve").is_open);
}

#[test]
fn manual_relay_and_valve_control() {
    let rig = rig();
    let manual = rig.controller.manual();
    manual.control_valve("V1", true).expect("open");
    manual.set_relay("Chiller_Relay", true).expect("relay on");

    assert!(rig.store.valve("V1").expect("valve").is_open);
    assert!(rig.store.relay("Chiller_Relay").expect("relay").is_active);
    assert_eq!(rig.gw.relay_state(VALVE_CIRCUIT), Some(true));
    assert_eq!(rig.logs_containing("manually"), 2);
}

#[test]
fn commands_interleave_with_running_cycles() {
    let mut rig = rig();
    let manual = rig.controller.manual();
    let worker = thread::spawn(move || {
        for i in 0..50u8 {
            manual
                .set_target_temperature("T1", 15.0 + f32::from(i % 5))
                .expect("set target");
        }
    });
    for _ in 0..50 {
        rig.controller.cycle();
    }
    worker.join().expect("worker");
    let target = rig.store.tank("T1").expect("tank").target_temperature;
    assert!((15.0..=19.0).contains(&target));
}
