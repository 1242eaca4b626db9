// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Raw document layer
//!
//! Typed structs drop information a round-tripping tool needs: key order,
//! unknown keys, and the difference between a missing key and an explicit
//! `null`. [`RawDocument`] keeps the parsed YAML mapping intact (insertion
//! order preserved) and answers exactly those questions.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::{ConfigError, ConfigResult, GroupingDoc};

/// A parsed YAML document with key order and explicit nulls preserved
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    root: Value,
}

impl RawDocument {
    /// Parse a document from text.
    ///
    /// The top level must be a mapping (an empty document counts as an empty
    /// mapping). Comment lines and quoting style are not retained; key/value
    /// pairs and their order are.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let value: Value = serde_yaml::from_str(text)?;
        let root = match value {
            Value::Null => Value::Mapping(Mapping::new()),
            Value::Mapping(_) => value,
            other => {
                return Err(ConfigError::ParseError(format!(
                    "top level must be a mapping, found {}",
                    value_kind(&other)
                )))
            }
        };
        Ok(Self { root })
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "parsed raw document");
        Self::parse(&text)
    }

    /// Serialize back to YAML, preserving key order and sequence order
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        serde_yaml::to_string(&self.root).map_err(ConfigError::from)
    }

    /// Top-level value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Value for `key` inside the one-level nested `block`
    pub fn get_nested(&self, block: &str, key: &str) -> Option<&Value> {
        self.root.get(block)?.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// True when `key` is present and set to the explicit null marker.
    ///
    /// Distinct from a missing key: `reject: null` disables rejection,
    /// an absent `reject` leaves the consumer default in place.
    pub fn is_explicit_null(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Null))
    }

    pub fn is_explicit_null_nested(&self, block: &str, key: &str) -> bool {
        matches!(self.get_nested(block, key), Some(Value::Null))
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> Vec<&str> {
        match self.root.as_mapping() {
            Some(mapping) => mapping.keys().filter_map(Value::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Keys of a nested block in document order
    pub fn block_keys(&self, block: &str) -> Vec<&str> {
        match self.get(block).and_then(Value::as_mapping) {
            Some(mapping) => mapping.keys().filter_map(Value::as_str).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.root.as_mapping().map(Mapping::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deserialize into a typed document
    pub fn deserialize<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_yaml::from_value(self.root.clone()).map_err(ConfigError::from)
    }

    /// Interpret the document as a grouping document (mapping of sequences)
    pub fn to_grouping(&self) -> ConfigResult<GroupingDoc> {
        let mapping = match self.root.as_mapping() {
            Some(mapping) => mapping,
            None => return Ok(GroupingDoc::default()),
        };
        let mut groups = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key
                .as_str()
                .ok_or_else(|| {
                    ConfigError::ParseError("grouping keys must be strings".to_string())
                })?
                .to_string();
            let seq = value.as_sequence().ok_or_else(|| {
                ConfigError::ParseError(format!("grouping '{name}' must be a sequence"))
            })?;
            let mut members = Vec::with_capacity(seq.len());
            for item in seq {
                match item.as_str() {
                    Some(member) => members.push(member.to_string()),
                    None => {
                        return Err(ConfigError::ParseError(format!(
                            "grouping '{name}' holds a non-string member"
                        )))
                    }
                }
            }
            groups.push((name, members));
        }
        Ok(GroupingDoc::new(groups))
    }
}

/// Document kinds this crate models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Connectivity,
    Dcnn,
    Preproc,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Connectivity => write!(f, "connectivity"),
            DocumentKind::Dcnn => write!(f, "dcnn"),
            DocumentKind::Preproc => write!(f, "preproc"),
        }
    }
}

/// Guess the document kind from its top-level keys.
///
/// Connectivity documents are flat and carry the band sequences; the gDCNN
/// document nests a `meg` block; the pipeline document carries stage blocks.
pub fn detect_kind(doc: &RawDocument) -> Option<DocumentKind> {
    if doc.contains("con_methods") || (doc.contains("fmin") && doc.contains("fmax")) {
        return Some(DocumentKind::Connectivity);
    }
    if doc.contains("meg") {
        return Some(DocumentKind::Dcnn);
    }
    if doc.contains("noise_reducer")
        || doc.contains("suggest_bads")
        || doc.get_nested("global", "stage").is_some()
    {
        return Some(DocumentKind::Preproc);
    }
    if doc.contains("path") {
        return Some(DocumentKind::Dcnn);
    }
    None
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CONNECTIVITY_DOC: &str = r#"
# connectivity analysis parameters
con_methods: ['coh', 'imcoh', 'plv']
fmin: [4., 8., 13., 31.]
fmax: [7., 12., 30., 45.]
freqs: ['4-7', '8-12', '13-30', '31-45']
freq_band_names: ['theta', 'alpha', 'beta', 'gamma']
extract_mode: 'mean_flip'
con_mode: 'multitaper'
"#;

    #[test]
    fn test_key_order_preserved() {
        let doc = RawDocument::parse(CONNECTIVITY_DOC).unwrap();
        assert_eq!(
            doc.keys(),
            [
                "con_methods",
                "fmin",
                "fmax",
                "freqs",
                "freq_band_names",
                "extract_mode",
                "con_mode"
            ]
        );
    }

    #[test]
    fn test_round_trip_preserves_pairs_and_order() {
        let doc = RawDocument::parse(CONNECTIVITY_DOC).unwrap();
        let serialized = doc.to_yaml_string().unwrap();
        let reparsed = RawDocument::parse(&serialized).unwrap();
        assert_eq!(reparsed.keys(), doc.keys());
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_sequence_order_survives_round_trip() {
        let doc = RawDocument::parse("fmin: [31., 4., 13., 8.]").unwrap();
        let reparsed = RawDocument::parse(&doc.to_yaml_string().unwrap()).unwrap();
        let seq = reparsed.get("fmin").unwrap().as_sequence().unwrap();
        let values: Vec<f64> = seq.iter().filter_map(Value::as_f64).collect();
        assert_eq!(values, [31.0, 4.0, 13.0, 8.0]);
    }

    #[test]
    fn test_trailing_dot_floats() {
        let doc = RawDocument::parse("reflp: 5.\nrefhp: 0.1").unwrap();
        assert_eq!(doc.get("reflp").unwrap().as_f64(), Some(5.0));
        assert_eq!(doc.get("refhp").unwrap().as_f64(), Some(0.1));
    }

    #[test]
    fn test_capitalized_booleans() {
        let doc = RawDocument::parse("run: True\nsave: False").unwrap();
        assert_eq!(doc.get("run").unwrap().as_bool(), Some(true));
        assert_eq!(doc.get("save").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn test_comment_lines_ignored() {
        let doc = RawDocument::parse("# header\nfmax: 300.\n# trailing note\n").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("fmax").unwrap().as_f64(), Some(300.0));
    }

    #[test]
    fn test_explicit_null_vs_missing() {
        let doc = RawDocument::parse("meg:\n  reject: null\n  ecg_ch: 'ECG 001'").unwrap();
        assert!(doc.is_explicit_null_nested("meg", "reject"));
        assert!(!doc.is_explicit_null_nested("meg", "eog_ch2"));
        assert!(doc.get_nested("meg", "eog_ch2").is_none());
        assert_eq!(
            doc.get_nested("meg", "ecg_ch").unwrap().as_str(),
            Some("ECG 001")
        );
    }

    #[test]
    fn test_null_round_trips_as_null() {
        let doc = RawDocument::parse("ica:\n  ecg_thresh_corr: null").unwrap();
        let reparsed = RawDocument::parse(&doc.to_yaml_string().unwrap()).unwrap();
        assert!(reparsed.is_explicit_null_nested("ica", "ecg_thresh_corr"));
    }

    #[test]
    fn test_empty_document() {
        let doc = RawDocument::parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.keys(), Vec::<&str>::new());
    }

    #[test]
    fn test_non_mapping_top_level_rejected() {
        let err = RawDocument::parse("- 1\n- 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn test_deserialize_to_typed() {
        let doc = RawDocument::parse(CONNECTIVITY_DOC).unwrap();
        let config: crate::ConnectivityConfig = doc.deserialize().unwrap();
        assert_eq!(config.con_methods.len(), 3);
        assert_eq!(config.fmin, [4.0, 8.0, 13.0, 31.0]);
    }

    #[test]
    fn test_to_grouping_preserves_group_order() {
        let doc = RawDocument::parse(
            "occipital: ['cuneus', 'lingual']\nfrontal: ['frontalpole']\n",
        )
        .unwrap();
        let grouping = doc.to_grouping().unwrap();
        let names: Vec<_> = grouping.group_names().collect();
        assert_eq!(names, ["occipital", "frontal"]);
        assert_eq!(
            grouping.members("occipital").unwrap(),
            ["cuneus".to_string(), "lingual".to_string()]
        );
    }

    #[test]
    fn test_to_grouping_rejects_scalar_group() {
        let doc = RawDocument::parse("frontal: 3").unwrap();
        let err = doc.to_grouping().unwrap_err();
        assert!(err.to_string().contains("frontal"));
    }

    #[test]
    fn test_detect_kind() {
        let con = RawDocument::parse("con_methods: ['coh']").unwrap();
        assert_eq!(detect_kind(&con), Some(DocumentKind::Connectivity));

        let dcnn = RawDocument::parse("meg:\n  vendor: '4D'").unwrap();
        assert_eq!(detect_kind(&dcnn), Some(DocumentKind::Dcnn));

        let preproc = RawDocument::parse("noise_reducer:\n  run: True").unwrap();
        assert_eq!(detect_kind(&preproc), Some(DocumentKind::Preproc));

        let preproc = RawDocument::parse("global:\n  stage: '/data'").unwrap();
        assert_eq!(detect_kind(&preproc), Some(DocumentKind::Preproc));

        let unknown = RawDocument::parse("foo: 1").unwrap();
        assert_eq!(detect_kind(&unknown), None);
    }

    proptest! {
        #[test]
        fn prop_key_order_round_trips(
            keys in proptest::collection::hash_set(
                "[a-z][a-z0-9_]{1,8}".prop_filter("YAML keyword", |k| {
                    !matches!(k.as_str(), "true" | "false" | "null")
                }),
                1..12,
            )
        ) {
            let keys: Vec<String> = keys.into_iter().collect();
            let mut text = String::new();
            for (i, key) in keys.iter().enumerate() {
                text.push_str(&format!("{key}: {i}\n"));
            }
            let doc = RawDocument::parse(&text).unwrap();
            prop_assert_eq!(doc.keys(), keys.iter().map(String::as_str).collect::<Vec<_>>());
            let reparsed = RawDocument::parse(&doc.to_yaml_string().unwrap()).unwrap();
            prop_assert_eq!(reparsed.keys(), doc.keys());
        }

        #[test]
        fn prop_sequence_order_round_trips(values in proptest::collection::vec(-1000i64..1000, 0..24)) {
            let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let text = format!("order_sensitive: [{}]\n", rendered.join(", "));
            let doc = RawDocument::parse(&text).unwrap();
            let reparsed = RawDocument::parse(&doc.to_yaml_string().unwrap()).unwrap();
            let seq: Vec<i64> = reparsed
                .get("order_sensitive")
                .unwrap()
                .as_sequence()
                .unwrap()
                .iter()
                .filter_map(Value::as_i64)
                .collect();
            prop_assert_eq!(seq, values);
        }
    }
}
