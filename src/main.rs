//! slotinv - scripted runner for slot inventories
//!
//! Loads an inventory config, plays a JSON scenario against it and optionally
//! writes every flushed change as JSONL.

mod scenario;

use anyhow::{Context, Result};
use scenario::{Scenario, ScenarioRunner};
use slotinv_inventory::InventoryConfig;
use slotinv_testkit::JsonlSink;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting slotinv v{}", env!("CARGO_PKG_VERSION"));

    let cli = config_from_iter(env::args().skip(1))?;
    let config = match (&cli.config, cli.strict_config) {
        (Some(path), true) => InventoryConfig::load_strict(path)?,
        (Some(path), false) => InventoryConfig::load_from_path(path),
        (None, _) => InventoryConfig::load(),
    };

    let scenario = Scenario::from_path(&cli.script)?;
    let mut runner = ScenarioRunner::new(&scenario, &config)?;

    let mut log = match &cli.log {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("failed to create change log {}", path.display()))?,
        ),
        None => None,
    };
    let summary = runner.run(&scenario, log.as_mut())?;
    if let Some(log) = log {
        log.finish()?;
    }

    for (name, inventory) in runner.inventories() {
        println!(
            "{name}: {}/{} slots used",
            inventory.capacity() - inventory.empty_slot_count(),
            inventory.capacity()
        );
    }
    println!(
        "{} steps, {} applied, {} notifications, {} overflowed",
        summary.steps,
        summary.applied_steps,
        summary.notifications,
        summary.overflow.total_magnitude()
    );
    Ok(())
}

#[derive(Debug)]
struct CliConfig {
    config: Option<PathBuf>,
    strict_config: bool,
    script: PathBuf,
    log: Option<PathBuf>,
}

fn config_from_iter<I>(mut args: I) -> Result<CliConfig>
where
    I: Iterator<Item = String>,
{
    let mut config = None;
    let mut strict_config = false;
    let mut script = None;
    let mut log = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = args.next().map(PathBuf::from),
            "--strict-config" => strict_config = true,
            "--script" => script = args.next().map(PathBuf::from),
            "--log" => log = args.next().map(PathBuf::from),
            other => tracing::warn!("ignoring unknown argument {other:?}"),
        }
    }
    let script = script.context("missing --script <scenario.json>")?;
    Ok(CliConfig {
        config,
        strict_config,
        script,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_paths_and_flags() {
        let cli = config_from_iter(args(&[
            "--config",
            "inv.toml",
            "--script",
            "run.json",
            "--strict-config",
            "--log",
            "out.jsonl",
        ]))
        .expect("valid args");
        assert_eq!(cli.config, Some(PathBuf::from("inv.toml")));
        assert_eq!(cli.script, PathBuf::from("run.json"));
        assert_eq!(cli.log, Some(PathBuf::from("out.jsonl")));
        assert!(cli.strict_config);
    }

    #[test]
    fn script_is_required() {
        let err = config_from_iter(args(&["--config", "inv.toml"])).unwrap_err();
        assert!(err.to_string().contains("--script"), "unexpected error: {err:#}");
    }
}
