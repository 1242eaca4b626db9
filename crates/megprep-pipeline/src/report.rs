// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Report manifests: artifact lists per recording

use crate::PipelineResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact manifest written under the report directory.
///
/// Maps recording names to the artifact files produced for them, serialized
/// as a plain YAML mapping of sequences in `<prefix>-report.yaml`. Saving
/// folds new entries into an existing manifest instead of replacing it, so
/// successive runs over different subjects share one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportManifest {
    entries: BTreeMap<String, Vec<String>>,
}

impl ReportManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest path for a log prefix under the report directory
    pub fn manifest_path(report_dir: &Path, prefix: &str) -> PathBuf {
        report_dir.join(format!("{}-report.yaml", prefix))
    }

    /// Record one artifact for a recording, ignoring duplicates
    pub fn add(&mut self, recording: &str, artifact: impl Into<String>) {
        let artifact = artifact.into();
        let artifacts = self.entries.entry(recording.to_string()).or_default();
        if !artifacts.contains(&artifact) {
            artifacts.push(artifact);
        }
    }

    pub fn artifacts(&self, recording: &str) -> Option<&[String]> {
        self.entries.get(recording).map(Vec::as_slice)
    }

    pub fn recordings(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold another manifest into this one; existing artifacts keep their
    /// position, new ones are appended
    pub fn merge(&mut self, other: ReportManifest) {
        for (recording, artifacts) in other.entries {
            let known = self.entries.entry(recording).or_default();
            for artifact in artifacts {
                if !known.contains(&artifact) {
                    known.push(artifact);
                }
            }
        }
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write the manifest, merging into an existing file when present
    pub fn save_merged(&self, path: &Path) -> PipelineResult<()> {
        let mut merged = if path.is_file() {
            Self::load(path)?
        } else {
            Self::default()
        };
        merged.merge(self.clone());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(&merged)?)?;
        debug!(path = %path.display(), entries = merged.len(), "report manifest written");
        Ok(())
    }
}
