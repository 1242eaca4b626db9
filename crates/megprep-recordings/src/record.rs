// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! A single MEG recording on disk

use std::fmt;
use std::path::{Path, PathBuf};

/// One MEG measurement file.
///
/// Naming convention: the file name starts with the subject ID, followed by
/// underscore-separated acquisition metadata, ending in a suffix from the
/// configured extension list, e.g. `203404_TEST01_100715_1030_1_c,rfDC-raw.fif`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Recording {
    path: PathBuf,
}

impl Recording {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path of the recording file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without the directory
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Directory holding the recording
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Subject ID: the leading underscore-separated token of the file name
    pub fn subject_id(&self) -> &str {
        let name = self.name();
        name.split('_').next().unwrap_or(name)
    }

    /// First suffix from `suffixes` that the file name ends with
    pub fn matched_suffix<'a>(&self, suffixes: &'a [String]) -> Option<&'a str> {
        suffixes
            .iter()
            .map(String::as_str)
            .find(|suffix| self.name().ends_with(suffix))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl fmt::Display for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_is_leading_token() {
        let rec = Recording::new("/data/MEG/203404/203404_TEST01_100715_1030_1_c,rfDC-raw.fif");
        assert_eq!(rec.subject_id(), "203404");
        assert_eq!(rec.name(), "203404_TEST01_100715_1030_1_c,rfDC-raw.fif");
        assert_eq!(rec.dir(), Path::new("/data/MEG/203404"));
    }

    #[test]
    fn test_subject_id_without_underscores() {
        let rec = Recording::new("/data/sub-raw.fif");
        assert_eq!(rec.subject_id(), "sub-raw.fif");
    }

    #[test]
    fn test_matched_suffix_respects_list_order() {
        let rec = Recording::new("109077_Chrono01_110518_1415_1_c,rfDC-raw.fif");
        let suffixes = vec!["-empty.fif".to_string(), "c,rfDC-raw.fif".to_string()];
        assert_eq!(rec.matched_suffix(&suffixes), Some("c,rfDC-raw.fif"));

        let suffixes = vec!["-epo.fif".to_string()];
        assert_eq!(rec.matched_suffix(&suffixes), None);
    }
}
