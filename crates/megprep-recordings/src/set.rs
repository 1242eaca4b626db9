// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sorted, de-duplicated recording collections

use crate::Recording;

/// A collection of recordings, kept sorted by path with duplicates removed.
///
/// The sort order fixes the iteration order of the pipeline looper, so a run
/// over the same stage directory always processes recordings in the same
/// sequence regardless of discovery route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSet {
    recordings: Vec<Recording>,
}

impl RecordingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from an unordered batch
    pub fn from_vec(mut recordings: Vec<Recording>) -> Self {
        recordings.sort();
        recordings.dedup();
        Self { recordings }
    }

    /// Insert one recording, keeping order; returns false if already present
    pub fn insert(&mut self, recording: Recording) -> bool {
        match self.recordings.binary_search(&recording) {
            Ok(_) => false,
            Err(pos) => {
                self.recordings.insert(pos, recording);
                true
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recording> {
        self.recordings.iter()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Unique subject IDs in set order
    pub fn subject_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for recording in &self.recordings {
            let id = recording.subject_id();
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

impl Extend<Recording> for RecordingSet {
    fn extend<T: IntoIterator<Item = Recording>>(&mut self, iter: T) {
        for recording in iter {
            self.insert(recording);
        }
    }
}

impl FromIterator<Recording> for RecordingSet {
    fn from_iter<T: IntoIterator<Item = Recording>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordingSet {
    type Item = &'a Recording;
    type IntoIter = std::slice::Iter<'a, Recording>;

    fn into_iter(self) -> Self::IntoIter {
        self.recordings.iter()
    }
}

impl IntoIterator for RecordingSet {
    type Item = Recording;
    type IntoIter = std::vec::IntoIter<Recording>;

    fn into_iter(self) -> Self::IntoIter {
        self.recordings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str) -> Recording {
        Recording::new(path)
    }

    #[test]
    fn test_from_vec_sorts_and_dedups() {
        let set = RecordingSet::from_vec(vec![
            rec("/stage/205382/205382_TEST01-raw.fif"),
            rec("/stage/203404/203404_TEST01-raw.fif"),
            rec("/stage/205382/205382_TEST01-raw.fif"),
        ]);

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(Recording::name).collect();
        assert_eq!(names, ["203404_TEST01-raw.fif", "205382_TEST01-raw.fif"]);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = RecordingSet::new();
        assert!(set.insert(rec("/stage/a/a_1-raw.fif")));
        assert!(!set.insert(rec("/stage/a/a_1-raw.fif")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_subject_ids_unique_ordered() {
        let set = RecordingSet::from_vec(vec![
            rec("/stage/203404/203404_TEST01-raw.fif"),
            rec("/stage/203404/203404_TEST02-raw.fif"),
            rec("/stage/109077/109077_Chrono01-raw.fif"),
        ]);

        assert_eq!(set.subject_ids(), ["109077", "203404"]);
    }

    #[test]
    fn test_extend_merges_sets() {
        let mut set = RecordingSet::from_vec(vec![rec("/stage/a/a_1-raw.fif")]);
        let other = RecordingSet::from_vec(vec![
            rec("/stage/a/a_1-raw.fif"),
            rec("/stage/b/b_1-raw.fif"),
        ]);

        set.extend(other);
        assert_eq!(set.len(), 2);
    }
}
