// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! megprep pipeline runner
//!
//! Loads and validates the pipeline document, discovers recordings and
//! drives the stage plan over them. Exit code 0 on success, 1 on validation
//! failure or when every recording failed.

use anyhow::Result;
use clap::Parser;
use megprep_config::{load_preproc_config, validate_preproc};
use megprep_observability::{debug_flags_help, init_logging, parse_debug_flags};
use megprep_pipeline::{ReportManifest, StagePlan};
use megprep_recordings::RecordingSet;
use megprep_runner::{discover_recordings, execute, report_dir};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "megprep-runner",
    version,
    author,
    about = "MEG preprocessing pipeline runner",
    long_about = None,
    after_help = debug_flags_help()
)]
struct RunnerArgs {
    /// Pipeline document (default: search for megprep.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stage root directory override
    #[arg(long, value_name = "DIR")]
    stage: Option<String>,

    /// Comma-separated subject ID override
    #[arg(long, value_name = "IDS")]
    subjects: Option<String>,

    /// Recording list file
    #[arg(long, value_name = "FILE")]
    list_file: Option<PathBuf>,

    /// Explicit recording path, relative to the stage root (repeatable)
    #[arg(long = "recording", value_name = "FILE")]
    recordings: Vec<PathBuf>,

    /// Print the resolved plan without executing stages
    #[arg(long)]
    dry_run: bool,

    /// Machine-readable JSON output
    #[arg(long)]
    json: bool,

    /// Base directory for log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Validate the pipeline document and exit
    #[arg(long)]
    validate_only: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    // Debug flags are extracted before clap sees the arguments
    let raw: Vec<String> = std::env::args().collect();
    let debug_flags = parse_debug_flags(&raw);
    let filtered: Vec<String> = raw
        .iter()
        .filter(|arg| !arg.starts_with("--debug-"))
        .cloned()
        .collect();
    let args = RunnerArgs::parse_from(filtered);

    let mut overrides = HashMap::new();
    if let Some(stage) = &args.stage {
        overrides.insert("stage".to_string(), stage.clone());
    }
    if let Some(subjects) = &args.subjects {
        overrides.insert("subjects".to_string(), subjects.clone());
    }

    let config = load_preproc_config(args.config.as_deref(), Some(&overrides))?;
    validate_preproc(&config)?;

    if args.validate_only {
        println!("pipeline document OK");
        return Ok(0);
    }

    let log2file = config.global.log2file && !args.dry_run;
    let _guard = init_logging(
        &debug_flags,
        args.log_dir.clone(),
        &config.global.logprefix,
        log2file,
        None,
    )?;

    info!(
        version = megprep_runner::VERSION,
        stage = %config.global.stage,
        "megprep runner starting"
    );

    let recordings = discover_recordings(&config, &args.recordings, args.list_file.as_deref())?;
    if recordings.is_empty() {
        anyhow::bail!("no recordings found under stage '{}'", config.global.stage);
    }
    info!(
        count = recordings.len(),
        subjects = recordings.subject_ids().len(),
        "recordings discovered"
    );

    let plan = StagePlan::from_config(&config);
    if plan.is_empty() {
        anyhow::bail!("every pipeline stage is disabled");
    }

    if args.dry_run {
        print_plan(&plan, &recordings, args.json)?;
        return Ok(0);
    }

    let (summary, manifest) = execute(&plan, &recordings);

    if !manifest.is_empty() {
        let manifest_path =
            ReportManifest::manifest_path(&report_dir(&config), &config.global.logprefix);
        if let Err(err) = manifest.save_merged(&manifest_path) {
            warn!(path = %manifest_path.display(), error = %err, "cannot write report manifest");
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }

    Ok(if summary.all_failed() { 1 } else { 0 })
}

fn print_plan(plan: &StagePlan, recordings: &RecordingSet, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "plan": plan,
            "recordings": recordings
                .iter()
                .map(|r| serde_json::json!({
                    "recording": r.name(),
                    "subject_id": r.subject_id(),
                    "output": plan.output_name(r.name()),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "plan: {} stage(s), {} recording(s)",
        plan.len(),
        recordings.len()
    );
    for (idx, planned) in plan.stages().iter().enumerate() {
        if planned.postfix.is_empty() {
            println!("  {}. {}", idx + 1, planned.stage);
        } else {
            println!(
                "  {}. {} (postfix ,{})",
                idx + 1,
                planned.stage,
                planned.postfix
            );
        }
    }
    for recording in recordings {
        println!(
            "  {} -> {}",
            recording.name(),
            plan.output_name(recording.name())
        );
    }
    Ok(())
}
