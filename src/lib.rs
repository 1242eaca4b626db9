//! # megprep - MEG preprocessing configuration & pipeline toolkit
//!
//! megprep is the configuration and orchestration layer of a MEG analysis
//! codebase: typed YAML documents for connectivity analysis, gDCNN artifact
//! labelling and batch preprocessing, plus recording discovery and a
//! fail-soft pipeline looper. The signal mathematics live elsewhere; this
//! crate plans, sequences, validates and logs.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! megprep = "0.1"  # Default: full features
//! ```
//!
//! ```rust,no_run
//! use megprep::prelude::*;
//!
//! // Load the pipeline document (megprep.yaml) with overrides applied
//! let config = load_preproc_config(None, None)?;
//! validate_preproc(&config)?;
//!
//! // Discover recordings and build the stage plan
//! let suffixes = &config.global.file_extension;
//! let recordings = scan_subjects(
//!     std::path::Path::new(&config.global.stage),
//!     &config.global.subjects,
//!     suffixes,
//!     config.global.recursive,
//! )?;
//! let plan = StagePlan::from_config(&config);
//!
//! // Drive the plan; failures are captured per recording
//! let looper = PipelineLooper::new(&plan);
//! let summary = looper.run(&recordings, |_recording, _stage| {
//!     // stage execution goes here
//!     Ok(())
//! });
//! println!("{}", summary);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`full`** (default): All components
//! - **`recordings`**: Recording discovery
//! - **`pipeline`**: Stage plans, looper, report manifests, grouping
//! - **`observability`**: Logging initialization and debug flags
//!
//! The configuration layer (`megprep::config`) is always present.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: megprep-config                             │
//! │  (Typed documents, YAML I/O, validation, overrides)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Discovery: megprep-recordings                          │
//! │  (Subject scans, list files, recording sets)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Orchestration: megprep-pipeline                        │
//! │  (Stage plans, fail-soft looper, report manifests)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Drivers: megprep-runner, tools/check_config            │
//! │  (CLI, logging via megprep-observability)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Document Kinds
//!
//! - **Connectivity** (flat): estimator list, paired band edges, aligned
//!   label sequences
//! - **gDCNN** (nested): device/paths/MEG hardware/ICA thresholds, nullable
//!   scalars for disabled checks
//! - **Preproc** (nested): a `global` block plus one block per pipeline
//!   stage (`run`/`save`/`overwrite`/`postfix`)
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use megprep_config as config;

// Re-export discovery
#[cfg(feature = "recordings")]
pub use megprep_recordings as recordings;

// Re-export orchestration
#[cfg(feature = "pipeline")]
pub use megprep_pipeline as pipeline;

// Re-export logging setup
#[cfg(feature = "observability")]
pub use megprep_observability as observability;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::config::{
        load_connectivity_config, load_dcnn_config, load_preproc_config, validate_connectivity,
        validate_dcnn, validate_preproc, ConfigError, ConnectivityConfig, DcnnConfig,
        PreprocConfig, RawDocument,
    };

    #[cfg(feature = "recordings")]
    pub use crate::recordings::{read_list_file, scan_subjects, Recording, RecordingSet};

    #[cfg(feature = "pipeline")]
    pub use crate::pipeline::{
        PipelineError, PipelineLooper, ReportManifest, RunSummary, Stage, StagePlan,
    };

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, DebugFlags, LoggingGuard};
}
