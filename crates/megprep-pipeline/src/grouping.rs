// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Label-group resolution for connectivity post-processing

use crate::{PipelineError, PipelineResult};
use megprep_config::GroupingDoc;
use serde::Serialize;
use tracing::debug;

/// One group resolved against the available label names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub name: String,
    pub labels: Vec<String>,
}

fn member_matches(member: &str, label: &str) -> bool {
    label == member
        || label.strip_suffix("-lh").map_or(false, |base| base == member)
        || label.strip_suffix("-rh").map_or(false, |base| base == member)
}

/// Resolve every group member against the available label names.
///
/// A bare member matches both hemisphere variants (`-lh`/`-rh`); a suffixed
/// member matches exactly. Group order and member order follow the document.
/// Members matching no label fail the resolution, all of them named in the
/// error.
pub fn resolve_groups(doc: &GroupingDoc, labels: &[String]) -> PipelineResult<Vec<ResolvedGroup>> {
    let mut resolved = Vec::with_capacity(doc.len());
    let mut unmatched = Vec::new();

    for (group, members) in doc.groups() {
        let mut group_labels: Vec<String> = Vec::new();
        for member in members {
            let mut hit = false;
            for label in labels {
                if member_matches(member, label) {
                    hit = true;
                    if !group_labels.contains(label) {
                        group_labels.push(label.clone());
                    }
                }
            }
            if !hit {
                unmatched.push(format!("{}/{}", group, member));
            }
        }
        resolved.push(ResolvedGroup {
            name: group.clone(),
            labels: group_labels,
        });
    }

    if !unmatched.is_empty() {
        return Err(PipelineError::Grouping(format!(
            "group members matched no label: {}",
            unmatched.join(", ")
        )));
    }

    debug!(groups = resolved.len(), "label groups resolved");
    Ok(resolved)
}

/// Labels claimed by no group, in label order
pub fn ungrouped_labels<'a>(doc: &GroupingDoc, labels: &'a [String]) -> Vec<&'a str> {
    labels
        .iter()
        .map(String::as_str)
        .filter(|label| {
            !doc.groups()
                .iter()
                .any(|(_, members)| members.iter().any(|member| member_matches(member, label)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aparc_labels() -> Vec<String> {
        [
            "bankssts-lh",
            "bankssts-rh",
            "cuneus-lh",
            "cuneus-rh",
            "superiorfrontal-lh",
            "superiorfrontal-rh",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_bare_member_matches_both_hemispheres() {
        let doc = GroupingDoc::new(vec![
            ("frontal".to_string(), vec!["superiorfrontal".to_string()]),
            ("occipital".to_string(), vec!["cuneus".to_string()]),
        ]);

        let groups = resolve_groups(&doc, &aparc_labels()).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "frontal");
        assert_eq!(
            groups[0].labels,
            ["superiorfrontal-lh", "superiorfrontal-rh"]
        );
    }

    #[test]
    fn test_suffixed_member_matches_exactly() {
        let doc = GroupingDoc::new(vec![(
            "left_occipital".to_string(),
            vec!["cuneus-lh".to_string()],
        )]);

        let groups = resolve_groups(&doc, &aparc_labels()).unwrap();
        assert_eq!(groups[0].labels, ["cuneus-lh"]);
    }

    #[test]
    fn test_unmatched_members_error_names_them() {
        let doc = GroupingDoc::new(vec![(
            "temporal".to_string(),
            vec!["bankssts".to_string(), "insulaX".to_string()],
        )]);

        let err = resolve_groups(&doc, &aparc_labels()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("temporal/insulaX"));
        assert!(!msg.contains("bankssts-lh"));
    }

    #[test]
    fn test_ungrouped_labels() {
        let doc = GroupingDoc::new(vec![(
            "frontal".to_string(),
            vec!["superiorfrontal".to_string()],
        )]);

        let labels = aparc_labels();
        let leftover = ungrouped_labels(&doc, &labels);
        assert_eq!(
            leftover,
            ["bankssts-lh", "bankssts-rh", "cuneus-lh", "cuneus-rh"]
        );
    }
}
