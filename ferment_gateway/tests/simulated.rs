use ferment_gateway::SimulatedGateway;
use ferment_gateway::error::GatewayError;
use ferment_traits::Gateway;
use rstest::rstest;

#[rstest]
fn unknown_circuits_use_defaults() {
    let gw = SimulatedGateway::with_default_temperature(12.5);
    let p = gw.temperature("28FF").unwrap();
    assert_eq!(p.value, Some(12.5));
    assert!(p.valid);
    assert!(!gw.digital_input("1_01").unwrap());
    assert!(!gw.relay("2_01").unwrap());
}

#[rstest]
fn lost_sensor_reports_invalid() {
    let gw = SimulatedGateway::new();
    gw.set_lost("28FF");
    let p = gw.temperature("28FF").unwrap();
    assert!(!p.valid);
    assert_eq!(p.value, None);
}

#[rstest]
fn writes_are_recorded_and_change_physical_state() {
    let gw = SimulatedGateway::new();
    gw.set_relay("2_01", true).unwrap();
    gw.set_relay("2_02", false).unwrap();
    gw.set_relay("2_01", false).unwrap();
    assert_eq!(gw.writes_to("2_01"), vec![true, false]);
    assert_eq!(gw.relay_state("2_01"), Some(false));
    assert_eq!(gw.writes().len(), 3);
}

#[rstest]
fn offline_circuit_fails_every_call_until_restored() {
    let gw = SimulatedGateway::new();
    gw.take_offline("2_01");
    let err = gw.set_relay("2_01", true).expect_err("offline");
    assert!(err.downcast_ref::<GatewayError>().is_some());
    assert!(gw.relay("2_01").is_err());
    assert!(gw.writes().is_empty());

    gw.restore("2_01");
    gw.set_relay("2_01", true).unwrap();
    assert_eq!(gw.relay_state("2_01"), Some(true));
}

#[rstest]
fn rejected_writes_leave_reads_working() {
    let gw = SimulatedGateway::new();
    gw.set_relay_state("2_03", true);
    gw.reject_writes("2_03");
    assert!(gw.set_relay("2_03", false).is_err());
    assert!(gw.relay("2_03").unwrap());
}
