use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const RIG: &str = r#"
[gateway]
base_url = "http://127.0.0.1:9/json"
timeout_ms = 200

[cycle]
interval_ms = 1

[[sensors]]
name = "S1"
circuit = "28A1"

[[valves]]
name = "V1"
circuit = "2_01"

[[tanks]]
name = "T1"
target_temperature = 20.0
sensor = "S1"
valve = "V1"

[[inputs]]
name = "Total_Stop_DI"
circuit = "1_01"

[[inputs]]
name = "Pump_DI"
circuit = "1_02"

[[inputs]]
name = "Chiller_DI"
circuit = "1_03"

[[relays]]
name = "Pump_Relay"
circuit = "2_02"

[[relays]]
name = "Chiller_Relay"
circuit = "2_03"
"#;

const ALARM_RELAY: &str = r#"
[[relays]]
name = "Alarm_Relay"
circuit = "2_08"
"#;

fn write_config(dir: &tempfile::TempDir, with_alarm: bool) -> PathBuf {
    let mut text = RIG.to_string();
    if with_alarm {
        text.push_str(ALARM_RELAY);
    }
    let path = dir.path().join("ferment.toml");
    fs::write(&path, text).unwrap();
    path
}

fn ferment(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("ferment").unwrap();
    cmd.arg("--config").arg(cfg).env_remove("RUST_LOG");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["once", "--sim"], 0, "\"alarm_active\": false", "stdout")]
#[case(&["run", "--sim", "--max-cycles", "3"], 0, "Stopped after 3 cycles", "stdout")]
#[case(&["self-check", "--sim"], 0, "Self-check OK", "stdout")]
#[case(&["self-check"], 4, "gateway unreachable", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, true);

    let mut cmd = ferment(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn hot_simulated_rig_raises_alarm() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, true);

    let out = ferment(&cfg)
        .args(["--json", "once", "--sim"])
        .env("FERMENT_SIM_TEMP", "30")
        .output()
        .unwrap();
    assert!(out.status.success());
    let status: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(status["alarm_active"], true);
    assert_eq!(status["tanks"][0]["valve_open"], true);
    assert_eq!(status["tanks"][0]["temperature"], 30.0);
}

#[test]
fn missing_alarm_relay_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, false);

    ferment(&cfg)
        .args(["once", "--sim"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Alarm_Relay"))
        .stderr(predicate::str::contains("[[relays]]"));
}

#[test]
fn missing_alarm_relay_json_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, false);

    let out = ferment(&cfg)
        .args(["--json", "self-check", "--sim"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let line = String::from_utf8_lossy(&out.stderr)
        .lines()
        .last()
        .unwrap()
        .to_string();
    let v: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(v["reason"], "MissingEntity");
    assert_eq!(v["details"]["name"], "Alarm_Relay");
}

#[rstest]
#[case("[cycle]\ninterval_ms = 0\n", "interval")]
#[case("[[tanks]]\nname = \"T2\"\nsensor = \"nope\"\n", "nope")]
#[case("[gateway\n", "not valid TOML")]
fn invalid_config_exits_3(#[case] extra: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, extra).unwrap();

    ferment(&path)
        .args(["once", "--sim"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    ferment(&path)
        .args(["once", "--sim"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn log_file_is_written() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("ferment.log");
    let mut text = format!("{RIG}{ALARM_RELAY}");
    text = text.replacen(
        "[cycle]",
        &format!("[logging]\nfile = {:?}\nlevel = \"info\"\n\n[cycle]", log.display().to_string()),
        1,
    );
    let path = dir.path().join("ferment.toml");
    fs::write(&path, text).unwrap();

    ferment(&path)
        .args(["run", "--sim", "--max-cycles", "2"])
        .env("FERMENT_SIM_TEMP", "30")
        .assert()
        .success();
    let written = fs::read_to_string(&log).unwrap();
    assert!(written.contains("Alarm triggered"));
}
