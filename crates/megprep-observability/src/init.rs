// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for megprep binaries
//!
//! Console output plus an optional per-run log file with run-count retention.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::DebugFlags;

/// Run directories kept by the retention cleanup
pub const DEFAULT_RETENTION_RUNS: usize = 10;

/// Logging initialization result.
///
/// Owns the non-blocking appender worker guards; dropping it flushes any
/// buffered log lines, so keep it alive for the whole run.
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Directory the file layer writes into (the run folder when file
    /// logging is on, the base log directory otherwise)
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize logging with console output and an optional file layer.
///
/// With `log2file` the file layer writes into a timestamped folder:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── preproc.log
/// ```
///
/// The filter comes from `RUST_LOG` when set, otherwise from the debug
/// flags (`info` baseline, `debug` per enabled crate).
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `log_dir` - Base directory for logs (default: `./logs`)
/// * `prefix` - Log file name prefix, `<prefix>.log`
/// * `log2file` - Whether to write the per-run log file
/// * `retention_runs` - Keep N most recent runs (default: 10)
pub fn init_logging(
    debug_flags: &DebugFlags,
    log_dir: Option<PathBuf>,
    prefix: &str,
    log2file: bool,
    retention_runs: Option<usize>,
) -> Result<LoggingGuard> {
    let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));

    let mut layers = Vec::new();
    let mut file_guards = Vec::new();

    // Console layer (human-readable)
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter(debug_flags))
        .boxed();
    layers.push(console_layer);

    let run_folder = if log2file {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = base_log_dir.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_runs(
            &base_log_dir,
            retention_runs.unwrap_or(DEFAULT_RETENTION_RUNS),
        )?;

        let file_appender = rolling::never(&run_folder, format!("{}.log", prefix));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guards.push(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_filter(build_filter(debug_flags))
            .boxed();
        layers.push(file_layer);

        run_folder
    } else {
        base_log_dir
    };

    Registry::default().with(layers).init();

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: run_folder,
    })
}

/// Initialize logging with default settings (console + `./logs` file layer)
pub fn init_logging_default(debug_flags: &DebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, None, "megprep", true, None)
}

// EnvFilter is not Clone, so each layer builds its own
fn build_filter(debug_flags: &DebugFlags) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(debug_flags.to_filter_string()))
}

/// Remove the oldest `run_*` directories beyond the retention count
fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(stamp) = name.strip_prefix("run_") {
                    if let Ok(dt) = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S") {
                        runs.push((path, dt));
                    }
                }
            }
        }
    }

    if runs.len() <= keep {
        return Ok(());
    }

    // Oldest first
    runs.sort_by_key(|(_, dt)| *dt);
    let excess = runs.len() - keep;
    for (path, _) in runs.iter().take(excess) {
        if let Err(e) = std::fs::remove_dir_all(path) {
            eprintln!(
                "Warning: failed to remove old log directory {}: {}",
                path.display(),
                e
            );
        }
    }

    Ok(())
}
