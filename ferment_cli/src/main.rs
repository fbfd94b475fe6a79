mod cli;
mod error_fmt;
mod rig;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{INVALID_CONFIG, exit_code_for_error, format_error_json, humanize};

fn load_config(path: &Path) -> Result<ferment_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg = ferment_config::load_toml(&text)?;
    cfg.validate().wrap_err(INVALID_CONFIG)?;
    Ok(cfg)
}

/// Console layer on stderr (stdout carries command output), plus an optional
/// JSON-lines file layer from `[logging]`. The returned guard flushes the file
/// on drop.
fn init_tracing(
    json: bool,
    level: Option<&str>,
    logging: &ferment_config::Logging,
) -> Result<Option<WorkerGuard>> {
    let level = level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("bad log level '{level}'"))?,
    };

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let mut guard = None;
    let file_layer = match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre!("logging.file '{file}' has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(guard)
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    let _guard = init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run { sim, max_cycles } => rig::cmd_run(&cfg, sim, max_cycles, cli.json),
        Commands::Once { sim } => rig::cmd_once(&cfg, sim, cli.json),
        Commands::SelfCheck { sim } => rig::cmd_self_check(&cfg, sim, cli.json),
    }
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if *JSON_MODE.get().unwrap_or(&false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}
