//! Human-readable error descriptions and structured JSON error formatting.

use ferment_core::{BuildError, CoreError, EntityKind};

/// Message prefix used when the config file fails to parse or validate.
pub const INVALID_CONFIG: &str = "invalid configuration";

fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Sensor => "[[sensors]]",
        EntityKind::Tank => "[[tanks]]",
        EntityKind::Valve => "[[valves]]",
        EntityKind::Input => "[[inputs]]",
        EntityKind::Relay => "[[relays]]",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingGateway => {
                "What happened: No gateway was provided to the controller.\nLikely causes: The gateway failed to initialize or was not wired into the builder.\nHow to fix: Check [gateway] in the config, or pass --sim to run against the simulated rig.".to_string()
            }
            BuildError::MissingStore => {
                "What happened: No state store was provided to the controller.\nLikely causes: The store was not wired into the builder.\nHow to fix: This is a bug in the caller; please report it.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/ferment.toml for a sample."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CoreError>() {
        if let CoreError::MissingEntity { kind, name } = ce {
            return format!(
                "What happened: The rig has no {kind} named '{name}', which the control loop requires.\nLikely causes: The {} entry was removed or renamed, or [roles] points at the wrong name.\nHow to fix: Add a {} entry with name = \"{name}\", or fix [roles] in the config.",
                table_for(*kind),
                table_for(*kind)
            );
        }
        return format!(
            "What happened: {ce}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML for this controller.\nLikely causes: A typo, a misspelled key, or a value of the wrong type.\nHow to fix: {}",
            te.message()
        );
    }

    // String-based heuristics for errors coming from config loading or probes
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with(INVALID_CONFIG) {
        let cause = err
            .chain()
            .nth(1)
            .map(ToString::to_string)
            .unwrap_or_default();
        return format!(
            "What happened: Invalid configuration ({cause}).\nLikely causes: Missing, duplicate, or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/ferment.toml for a sample."
        );
    }

    if lower.contains("gateway unreachable") {
        return format!(
            "What happened: {msg}.\nLikely causes: Gateway powered off, wrong [gateway].base_url, or a network problem.\nHow to fix: Check that the gateway answers at the configured URL, or raise [gateway].timeout_ms."
        );
    }

    if lower.contains("failed to read config") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config with the path to your ferment.toml."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 missing entity, 3 invalid config, 4 gateway unreachable, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(CoreError::MissingEntity { .. }) = err.downcast_ref::<CoreError>() {
        return 2;
    }
    if err.downcast_ref::<BuildError>().is_some()
        || err.downcast_ref::<toml::de::Error>().is_some()
        || err.to_string().starts_with(INVALID_CONFIG)
    {
        return 3;
    }
    if err.to_string().contains("gateway unreachable") {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "MissingEntity",
        3 => "InvalidConfig",
        4 => "GatewayUnreachable",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(CoreError::MissingEntity { kind, name }) = err.downcast_ref::<CoreError>() {
        return json!({
            "reason": reason_name(err),
            "details": { "kind": kind.to_string(), "name": name },
            "message": humanize(err),
        })
        .to_string();
    }

    json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
