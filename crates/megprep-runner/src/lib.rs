// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # megprep-runner
//!
//! Library half of the pipeline runner: recording discovery precedence and
//! run execution, separated from the CLI surface so they stay testable.

use megprep_config::{expand_path, PreprocConfig};
use megprep_pipeline::{
    apply_postfix, PipelineLooper, PipelineResult, ReportManifest, RunSummary, StageDetail,
    StagePlan,
};
use megprep_recordings::{read_list_file, scan_subjects, Recording, RecordingSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Discover the recordings to process.
///
/// Precedence: explicit `--recording` paths beat a list file, a list file
/// beats the subject scan. Relative explicit paths are joined onto the stage
/// root; missing ones are skipped with a warning.
pub fn discover_recordings(
    config: &PreprocConfig,
    explicit: &[PathBuf],
    list_file: Option<&Path>,
) -> PipelineResult<RecordingSet> {
    let stage = expand_path(&config.global.stage);

    if !explicit.is_empty() {
        let mut set = RecordingSet::new();
        for path in explicit {
            let full = if path.is_absolute() {
                path.clone()
            } else {
                stage.join(path)
            };
            let recording = Recording::new(full);
            if recording.exists() {
                set.insert(recording);
            } else {
                warn!(recording = %recording, "explicit recording not found, skipping");
            }
        }
        return Ok(set);
    }

    if let Some(list) = list_file {
        return Ok(read_list_file(list, &stage)?);
    }

    Ok(scan_subjects(
        &stage,
        &config.global.subjects,
        &config.global.file_extension,
        config.global.recursive,
    )?)
}

/// Report directory of a pipeline run: `<stage>/report`
pub fn report_dir(config: &PreprocConfig) -> PathBuf {
    expand_path(&config.global.stage).join("report")
}

/// Report artifact name for an output recording name
pub fn image_name(output: &str, image_format: &str) -> String {
    let stem = output.strip_suffix(".fif").unwrap_or(output);
    format!("{}.{}", stem, image_format)
}

/// Execute the plan over the recordings.
///
/// Stages record their planned outputs; the report stage collects one
/// artifact per recording into the returned manifest. No channel data is
/// touched here.
pub fn execute(plan: &StagePlan, recordings: &RecordingSet) -> (RunSummary, ReportManifest) {
    let mut manifest = ReportManifest::new();
    let mut current = String::new();
    let mut last: Option<String> = None;

    let looper = PipelineLooper::new(plan);
    let summary = looper.run(recordings, |recording, planned| {
        if last.as_deref() != Some(recording.name()) {
            last = Some(recording.name().to_string());
            current = recording.name().to_string();
        }

        match &planned.detail {
            StageDetail::Report { image_format } => {
                manifest.add(recording.name(), image_name(&current, image_format));
            }
            _ => {
                if planned.save && !planned.postfix.is_empty() {
                    current = apply_postfix(&current, &planned.postfix);
                    debug!(stage = %planned.stage, output = %current, "planned output");
                }
            }
        }
        Ok(())
    });

    (summary, manifest)
}
