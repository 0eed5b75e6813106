// src/lib.rs

pub mod action;
pub mod cancel;
pub mod cli;
pub mod condition;
pub mod conditions;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod monitor;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::conditions::{
    Every, FileContentChanged, FileExists, FileNotModifiedFor, NewFileInDirectory, PortOpen,
};
use crate::config::loader::load_and_validate;
use crate::config::model::{ConditionSpec, WatchConfig};
use crate::exec::CommandAction;

pub use crate::action::{Action, Flow};
pub use crate::cancel::CancelToken;
pub use crate::condition::{Condition, Evaluation};
pub use crate::errors::{Result, WatchpointError};
pub use crate::monitor::{
    on, watch, DispatchMode, Monitor, MonitorGuard, WorkerExit, WorkerReport,
};

/// How often the CLI re-checks whether the worker has exited.
const WAIT_SLICE: Duration = Duration::from_millis(200);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - watch file loading
/// - the monitor (condition + command action)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg, args.once);
        return Ok(());
    }

    let root_dir = config_root_dir(&config_path);
    let mut monitor = build_monitor(&cfg, &root_dir, args.once)?;
    let stop_timeout = monitor.stop_timeout();

    // `start` clears the token, so the signal handler is armed afterwards.
    monitor.start()?;

    // Ctrl-C → cooperative cancellation.
    {
        let cancel = monitor.cancel_token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received; cancelling monitor");
            cancel.cancel();
        });
    }

    let report = tokio::task::spawn_blocking(move || supervise(monitor)).await?;

    match report {
        Some(report) if report.exit.is_fault() => Err(anyhow!(
            "monitor '{}' stopped on a fault: {:?}",
            cfg.name,
            report.exit
        )),
        Some(report) => {
            info!(
                monitor = %cfg.name,
                exit = ?report.exit,
                actions_run = report.actions_run,
                action_failures = report.action_failures,
                "monitor finished"
            );
            Ok(())
        }
        None => Err(anyhow!(
            "monitor '{}' did not stop within {:?}",
            cfg.name,
            stop_timeout
        )),
    }
}

/// Block until a started monitor's worker exits.
///
/// The worker may end on its own or because its token was cancelled from
/// elsewhere; after cancellation the wait is bounded by the monitor's stop
/// timeout. Returns `None` if the worker never exited.
pub fn supervise(mut monitor: Monitor) -> Option<WorkerReport> {
    let cancel = monitor.cancel_token();
    let stop_timeout = monitor.stop_timeout();
    loop {
        if monitor.wait(WAIT_SLICE) {
            break;
        }
        if cancel.is_cancelled() {
            if !monitor.stop(stop_timeout) {
                warn!(monitor = %monitor.name(), "worker ignored cancellation");
            }
            break;
        }
    }
    monitor.last_report().cloned()
}

/// Build the condition described by validated watch file settings.
pub fn build_condition(spec: &ConditionSpec) -> Result<Box<dyn Condition>> {
    let condition: Box<dyn Condition> = match spec {
        ConditionSpec::Every { interval } => Box::new(Every::new(*interval)),
        ConditionSpec::FileExists { path, interval } => {
            Box::new(FileExists::new(path.clone()).interval(*interval))
        }
        ConditionSpec::NewFile {
            dir,
            pattern,
            interval,
        } => {
            let mut condition = NewFileInDirectory::new(dir.clone()).interval(*interval);
            if let Some(pattern) = pattern {
                condition = condition.matching(pattern)?;
            }
            Box::new(condition)
        }
        ConditionSpec::NotModified {
            path,
            duration,
            interval,
        } => Box::new(FileNotModifiedFor::new(path.clone(), *duration).interval(*interval)),
        ConditionSpec::ContentChanged { path, interval } => {
            Box::new(FileContentChanged::new(path.clone()).interval(*interval))
        }
        ConditionSpec::PortOpen {
            host,
            port,
            interval,
            connect_timeout,
        } => Box::new(
            PortOpen::new(host.clone(), *port)
                .interval(*interval)
                .connect_timeout(*connect_timeout),
        ),
    };
    Ok(condition)
}

/// Build a configured (not yet started) monitor from a validated watch file.
///
/// Relative paths in the condition are resolved against `root`. `once`
/// forces the action to quit after its first successful run.
pub fn build_monitor(cfg: &WatchConfig, root: &Path, once: bool) -> Result<Monitor> {
    let spec = cfg.condition.clone().resolve_paths(root);
    debug!(monitor = %cfg.name, ?spec, "building monitor");

    let action = CommandAction::new(cfg.action.cmd.clone())
        .quit_on_success(cfg.action.quit_on_success || once);

    let mut monitor = Monitor::named(cfg.name.clone()).with_stop_timeout(cfg.stop_timeout);
    monitor.on(build_condition(&spec)?)?.then(action)?;
    Ok(monitor)
}

/// Figure out the directory relative condition paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "watches/Watchpoint.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchpoint.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print the monitor, its condition and action.
fn print_dry_run(cfg: &WatchConfig, once: bool) {
    println!("watchpoint dry-run");
    println!("  monitor.name = {}", cfg.name);
    println!("  monitor.stop_timeout = {:?}", cfg.stop_timeout);
    println!();
    println!("condition:");
    println!("  {:?}", cfg.condition);
    println!();
    println!("action:");
    println!("  cmd: {}", cfg.action.cmd);
    if cfg.action.quit_on_success || once {
        println!("  quit_on_success: true");
    }

    debug!("dry-run complete (no monitoring)");
}
