// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # megprep-recordings
//!
//! Recording discovery for the MEG preprocessing pipeline.
//!
//! A recording is one measurement file on disk (`*-raw.fif` style). This
//! crate finds them three ways: scanning per-subject directories under a
//! stage root, reading a plain-text list file, or wrapping explicit paths.
//! All discovery routes produce a [`RecordingSet`], a sorted de-duplicated
//! collection the pipeline looper iterates.
//!
//! ## Usage
//!
//! ```no_run
//! use megprep_recordings::{scan_subjects, Recording};
//! use std::path::Path;
//!
//! let suffixes = vec!["-raw.fif".to_string()];
//! let set = scan_subjects(Path::new("/data/exp/MEG"), &[], &suffixes, false)?;
//! for recording in &set {
//!     println!("{} -> subject {}", recording.name(), recording.subject_id());
//! }
//! # Ok::<(), megprep_recordings::RecordingError>(())
//! ```

pub mod discover;
pub mod record;
pub mod set;

pub use discover::{read_list_file, scan_subjects};
pub use record::Recording;
pub use set::RecordingSet;

use thiserror::Error;

/// Errors that can occur during recording discovery
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Stage directory not found: {0}")]
    StageNotFound(String),

    #[error("Recording list file not found: {0}")]
    ListFileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;
