// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recording discovery: subject-directory scans and list files

use crate::{Recording, RecordingError, RecordingResult, RecordingSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scan per-subject directories under the stage root.
///
/// Every subdirectory of `stage` is a subject directory; when `subjects` is
/// non-empty only the listed IDs are visited. Files qualify when their name
/// ends with one of `suffixes`. Missing subject directories are skipped with
/// a warning; an unusable stage root is an error.
pub fn scan_subjects(
    stage: &Path,
    subjects: &[String],
    suffixes: &[String],
    recursive: bool,
) -> RecordingResult<RecordingSet> {
    if !stage.is_dir() {
        return Err(RecordingError::StageNotFound(stage.display().to_string()));
    }

    let subject_dirs = if subjects.is_empty() {
        list_subdirectories(stage)?
    } else {
        let mut dirs = Vec::new();
        for id in subjects {
            let dir = stage.join(id);
            if dir.is_dir() {
                dirs.push(dir);
            } else {
                warn!(subject = %id, stage = %stage.display(), "subject directory not found, skipping");
            }
        }
        dirs
    };

    let mut found = Vec::new();
    for dir in subject_dirs {
        if let Err(err) = collect_recordings(&dir, suffixes, recursive, &mut found) {
            warn!(dir = %dir.display(), error = %err, "cannot read subject directory, skipping");
        }
    }

    let set = RecordingSet::from_vec(found);
    debug!(stage = %stage.display(), count = set.len(), "recording scan complete");
    Ok(set)
}

fn list_subdirectories(stage: &Path) -> RecordingResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(stage)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn collect_recordings(
    dir: &Path,
    suffixes: &[String],
    recursive: bool,
    out: &mut Vec<Recording>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_recordings(&path, suffixes, recursive, out)?;
            }
            continue;
        }
        let recording = Recording::new(path);
        if recording.matched_suffix(suffixes).is_some() {
            out.push(recording);
        }
    }
    Ok(())
}

/// Read a recording list file.
///
/// One recording per line; blank lines and `#` comments are skipped, and only
/// the first whitespace-separated token of a line is taken (trailing fields
/// such as bad-channel annotations are ignored). Relative entries are joined
/// onto the stage root. Entries naming files that do not exist are dropped
/// with a warning.
pub fn read_list_file(path: &Path, stage: &Path) -> RecordingResult<RecordingSet> {
    if !path.is_file() {
        return Err(RecordingError::ListFileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let mut found = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let entry = line.split('#').next().unwrap_or("").trim();
        if entry.is_empty() {
            continue;
        }
        let token = entry.split_whitespace().next().unwrap_or(entry);

        let full = if Path::new(token).is_absolute() {
            PathBuf::from(token)
        } else {
            stage.join(token)
        };
        if !full.is_file() {
            warn!(
                line = lineno + 1,
                entry = token,
                "listed recording not found on disk, dropping"
            );
            continue;
        }
        found.push(Recording::new(full));
    }

    let set = RecordingSet::from_vec(found);
    debug!(list = %path.display(), count = set.len(), "recording list read");
    Ok(set)
}
