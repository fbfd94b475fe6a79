//! Rig assembly from config, and the three commands.

use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr};
use ferment_config::{Config, GatewayFlavor};
use ferment_core::{
    Controller, DeviceClient, LoopCfg, MemoryStore, RoleNames, RunParams, StateStore, Validity,
};
use ferment_gateway::{Flavor, HttpGateway, SimulatedGateway};
use ferment_traits::Gateway;
use serde_json::json;

/// Overrides the temperature (°C) every simulated sensor reports.
pub const SIM_TEMP_ENV: &str = "FERMENT_SIM_TEMP";

pub fn make_gateway(cfg: &Config, sim: bool) -> Result<Arc<dyn Gateway>> {
    if sim {
        let celsius = match std::env::var(SIM_TEMP_ENV) {
            Ok(v) => v
                .trim()
                .parse::<f32>()
                .wrap_err_with(|| format!("{SIM_TEMP_ENV} must be a number, got '{v}'"))?,
            Err(_) => 18.0,
        };
        tracing::info!(celsius, "using simulated gateway");
        return Ok(Arc::new(SimulatedGateway::with_default_temperature(celsius)));
    }
    let flavor = match cfg.gateway.flavor {
        GatewayFlavor::Temp => Flavor::Temp,
        GatewayFlavor::DataPoint => Flavor::DataPoint,
    };
    tracing::info!(base_url = %cfg.gateway.base_url, ?flavor, "using HTTP gateway");
    Ok(Arc::new(HttpGateway::new(
        cfg.gateway.base_url.clone(),
        Duration::from_millis(cfg.gateway.timeout_ms),
        flavor,
    )))
}

pub fn build_controller(
    cfg: &Config,
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn StateStore>,
) -> Result<Controller> {
    let loop_cfg = LoopCfg::from(cfg);
    Controller::builder()
        .with_gateway(gateway)
        .with_store(store)
        .with_roles(RoleNames::from(&cfg.roles))
        .with_persist_after(loop_cfg.persist_after)
        .build()
}

pub fn cmd_run(cfg: &Config, sim: bool, max_cycles: Option<u64>, json_out: bool) -> Result<()> {
    let gateway = make_gateway(cfg, sim)?;
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::from_config(cfg));
    let mut controller = build_controller(cfg, gateway, store)?;

    let (handle, signal) = ferment_core::shutdown_signal();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        handle.request();
    })
    .wrap_err("failed to install Ctrl-C handler")?;

    let params = RunParams {
        max_cycles,
        ..RunParams::from(&LoopCfg::from(cfg))
    };
    let summary = ferment_core::run(&mut controller, params, &signal);
    if json_out {
        println!(
            "{}",
            json!({
                "cycles": summary.cycles,
                "failed_steps": summary.failed_steps,
                "stopped_by_signal": summary.stopped_by_signal,
            })
        );
    } else {
        println!(
            "Stopped after {} cycles ({} failed steps).",
            summary.cycles, summary.failed_steps
        );
    }
    Ok(())
}

pub fn cmd_once(cfg: &Config, sim: bool, json_out: bool) -> Result<()> {
    let gateway = make_gateway(cfg, sim)?;
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::from_config(cfg));
    let mut controller = build_controller(cfg, gateway, store)?;

    let report = controller.cycle();
    let status = controller.status();
    let text = if json_out {
        serde_json::to_string(&status)?
    } else {
        serde_json::to_string_pretty(&status)?
    };
    println!("{text}");

    // Surface the first failed step as the command's error.
    match report.errors().first() {
        Some(e) => Err(eyre::Report::new((*e).clone())),
        None => Ok(()),
    }
}

pub fn cmd_self_check(cfg: &Config, sim: bool, json_out: bool) -> Result<()> {
    let gateway = make_gateway(cfg, sim)?;
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::from_config(cfg));
    // Resolving roles fails fast on a missing well-known entity.
    build_controller(cfg, Arc::clone(&gateway), store)?;

    let client = DeviceClient::new(gateway);
    let mut probes = Vec::new();
    for s in &cfg.sensors {
        let ok = client.probe_validity(&s.circuit) != Validity::Unknown;
        probes.push(("sensor", s.name.as_str(), s.circuit.as_str(), ok));
    }
    for i in &cfg.inputs {
        let ok = client.read_digital_input(&i.circuit).is_some();
        probes.push(("input", i.name.as_str(), i.circuit.as_str(), ok));
    }
    for (kind, list) in [("relay", &cfg.relays), ("valve", &cfg.valves)] {
        for c in list {
            let ok = client.read_relay_state(&c.circuit).is_some();
            probes.push((kind, c.name.as_str(), c.circuit.as_str(), ok));
        }
    }

    let failed = probes.iter().filter(|p| !p.3).count();
    if json_out {
        let items: Vec<_> = probes
            .iter()
            .map(|(kind, name, circuit, ok)| {
                json!({ "kind": kind, "name": name, "circuit": circuit, "reachable": ok })
            })
            .collect();
        println!("{}", json!({ "ok": failed == 0, "probes": items }));
    } else {
        for (kind, name, circuit, ok) in &probes {
            let mark = if *ok { "ok  " } else { "FAIL" };
            println!("{mark} {kind:<6} {name} ({circuit})");
        }
    }

    if failed > 0 {
        eyre::bail!(
            "gateway unreachable: {failed} of {} circuits did not answer",
            probes.len()
        );
    }
    if !json_out {
        println!("Self-check OK");
    }
    Ok(())
}
