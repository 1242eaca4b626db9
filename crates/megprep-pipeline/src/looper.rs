// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The pipeline looper: recordings x stages with fail-soft error capture

use crate::plan::{PlannedStage, StagePlan};
use crate::stage::apply_postfix;
use crate::PipelineResult;
use megprep_recordings::{Recording, RecordingSet};
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

/// Drives a stage plan over a recording set.
///
/// Stage execution is a caller-supplied callback; the looper owns iteration
/// order, output-name tracking and failure capture. A failing stage aborts
/// the remaining stages of that recording only; the run continues.
pub struct PipelineLooper<'a> {
    plan: &'a StagePlan,
}

impl<'a> PipelineLooper<'a> {
    pub fn new(plan: &'a StagePlan) -> Self {
        Self { plan }
    }

    pub fn run<F>(&self, recordings: &RecordingSet, mut op: F) -> RunSummary
    where
        F: FnMut(&Recording, &PlannedStage) -> PipelineResult<()>,
    {
        let mut outcomes = Vec::with_capacity(recordings.len());
        let mut stages_run = 0usize;

        for recording in recordings {
            info!(
                recording = %recording.name(),
                subject = recording.subject_id(),
                "processing recording"
            );

            let mut current = recording.name().to_string();
            let mut completed = Vec::new();
            let mut failure = None;

            for planned in self.plan.stages() {
                match op(recording, planned) {
                    Ok(()) => {
                        stages_run += 1;
                        completed.push(planned.stage.key().to_string());
                        if planned.save && !planned.postfix.is_empty() {
                            current = apply_postfix(&current, &planned.postfix);
                        }
                    }
                    Err(err) => {
                        error!(
                            recording = %recording.name(),
                            stage = %planned.stage,
                            error = %err,
                            "stage failed, skipping remaining stages for this recording"
                        );
                        failure = Some(err.to_string());
                        break;
                    }
                }
            }

            outcomes.push(RecordingOutcome {
                recording: recording.name().to_string(),
                subject_id: recording.subject_id().to_string(),
                output: if failure.is_none() { Some(current) } else { None },
                stages_completed: completed,
                error: failure,
            });
        }

        RunSummary::from_outcomes(outcomes, stages_run)
    }
}

/// Result of one recording's pass through the plan
#[derive(Debug, Clone, Serialize)]
pub struct RecordingOutcome {
    pub recording: String,
    pub subject_id: String,
    /// Planned output name; absent when the recording failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub stages_completed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated result of one looper run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stages_run: usize,
    pub outcomes: Vec<RecordingOutcome>,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<RecordingOutcome>, stages_run: usize) -> Self {
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        Self {
            processed: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
            stages_run,
            outcomes,
        }
    }

    /// True when at least one recording was attempted and none succeeded
    pub fn all_failed(&self) -> bool {
        self.processed > 0 && self.failed == self.processed
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordingOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "processed {} recording(s): {} ok, {} failed ({} stage invocations)",
            self.processed, self.succeeded, self.failed, self.stages_run
        )?;
        for outcome in &self.outcomes {
            match (&outcome.error, &outcome.output) {
                (Some(err), _) => writeln!(f, "  FAILED {}: {}", outcome.recording, err)?,
                (None, Some(output)) if *output != outcome.recording => {
                    writeln!(f, "  ok {} -> {}", outcome.recording, output)?
                }
                _ => writeln!(f, "  ok {}", outcome.recording)?,
            }
        }
        Ok(())
    }
}
