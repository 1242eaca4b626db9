// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # megprep-pipeline
//!
//! Orchestration layer of the MEG preprocessing toolkit.
//!
//! This crate turns a validated [`PreprocConfig`](megprep_config::PreprocConfig)
//! into an ordered [`StagePlan`], then drives a [`PipelineLooper`] over a set
//! of discovered recordings. The looper is fail-soft: a failing recording is
//! logged and recorded in the [`RunSummary`] and the run continues with the
//! next one. No signal processing happens here; stage execution is delegated
//! to a caller-supplied callback that receives the planned parameters.
//!
//! Also provided: output-name postfix chaining (`name,nr,bcc-raw.fif`),
//! report manifests (`<prefix>-report.yaml`), and label-group resolution for
//! connectivity post-processing.

pub mod grouping;
pub mod looper;
pub mod plan;
pub mod report;
pub mod stage;

pub use grouping::{resolve_groups, ungrouped_labels, ResolvedGroup};
pub use looper::{PipelineLooper, RecordingOutcome, RunSummary};
pub use plan::{resolve_value, PlannedStage, ReferenceFilter, StageDetail, StagePlan};
pub use report::ReportManifest;
pub use stage::{apply_postfix, Stage};

use thiserror::Error;

/// Errors that can occur during pipeline orchestration
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] megprep_config::ConfigError),

    #[error("Recording error: {0}")]
    Recording(#[from] megprep_recordings::RecordingError),

    #[error("Stage '{stage}' failed on {recording}: {reason}")]
    StageFailed {
        stage: String,
        recording: String,
        reason: String,
    },

    #[error("Grouping error: {0}")]
    Grouping(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
