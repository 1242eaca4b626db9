// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines the structs that map to the three YAML document kinds:
//! connectivity analysis, gDCNN artifact labelling, and the preprocessing
//! pipeline. Field names match the document keys; defaults reproduce the
//! band set, thresholds and stage conventions of the documents shipped under
//! `config/` (site-specific paths and subject lists excepted).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Connectivity analysis document
// ============================================================================

/// Connectivity analysis configuration (flat document)
///
/// `fmin`/`fmax`/`freqs`/`freq_band_names` are parallel sequences indexed by
/// frequency band; `envcor_freqs`/`envcor_band_names` are the auxiliary pair
/// used by envelope-correlation analysis.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub con_methods: Vec<String>,
    pub fmin: Vec<f64>,
    pub fmax: Vec<f64>,
    pub freqs: Vec<String>,
    pub freq_band_names: Vec<String>,
    pub extract_mode: String,
    pub con_mode: String,
    pub envcor_freqs: Vec<String>,
    pub envcor_band_names: Vec<String>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            con_methods: vec![
                "coh".to_string(),
                "imcoh".to_string(),
                "plv".to_string(),
                "pli".to_string(),
                "wpli2_debiased".to_string(),
            ],
            fmin: vec![4.0, 8.0, 13.0, 31.0],
            fmax: vec![7.0, 12.0, 30.0, 45.0],
            freqs: vec![
                "4-7".to_string(),
                "8-12".to_string(),
                "13-30".to_string(),
                "31-45".to_string(),
            ],
            freq_band_names: vec![
                "theta".to_string(),
                "alpha".to_string(),
                "beta".to_string(),
                "gamma".to_string(),
            ],
            extract_mode: "mean_flip".to_string(),
            con_mode: "multitaper".to_string(),
            envcor_freqs: vec!["8-12".to_string(), "13-30".to_string()],
            envcor_band_names: vec!["alpha".to_string(), "beta".to_string()],
        }
    }
}

/// One frequency band: edges plus the two labels aligned to it
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBand<'a> {
    pub fmin: f64,
    pub fmax: f64,
    pub label: &'a str,
    pub name: &'a str,
}

impl ConnectivityConfig {
    /// Number of frequency bands (length of the parallel sequences)
    pub fn band_count(&self) -> usize {
        self.fmin.len()
    }

    /// Iterate the bands with their aligned labels.
    ///
    /// Only meaningful on a validated document; on a ragged one the iterator
    /// stops at the shortest sequence.
    pub fn bands(&self) -> impl Iterator<Item = FrequencyBand<'_>> {
        self.fmin
            .iter()
            .zip(self.fmax.iter())
            .zip(self.freqs.iter())
            .zip(self.freq_band_names.iter())
            .map(|(((fmin, fmax), label), name)| FrequencyBand {
                fmin: *fmin,
                fmax: *fmax,
                label,
                name,
            })
    }

    /// Extraction modes accepted for `extract_mode`
    pub const EXTRACT_MODES: &'static [&'static str] = &["mean", "mean_flip", "pca_flip", "max"];

    /// Spectral estimation modes accepted for `con_mode`
    pub const CON_MODES: &'static [&'static str] = &["multitaper", "fourier", "cwt_morlet"];
}

// ============================================================================
// gDCNN artifact-labelling document
// ============================================================================

/// gDCNN artifact-labelling configuration (nested document)
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DcnnConfig {
    pub global: GlobalSettings,
    pub path: PathSettings,
    pub meg: MegSettings,
    pub ica: IcaSettings,
}

/// gDCNN global block: compute device and schema tag
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GlobalSettings {
    /// Compute device selector ("cpu" or "gpu")
    pub device: String,
    /// Versioned schema tag of the document
    pub version: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            device: "gpu".to_string(),
            version: "1.0".to_string(),
        }
    }
}

/// gDCNN path block: base directory plus relative subdirectories
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PathSettings {
    pub basedir: String,
    /// Raw recordings, relative to `basedir`
    pub data_meg: String,
    /// Labelled output, relative to `basedir`
    pub data_labeled: String,
    /// Reports, relative to `basedir`
    pub report: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            basedir: "/data/meg_store".to_string(),
            data_meg: "meg_rawdata".to_string(),
            data_labeled: "data_labeled".to_string(),
            report: "report".to_string(),
        }
    }
}

impl PathSettings {
    pub fn data_meg_dir(&self) -> PathBuf {
        PathBuf::from(&self.basedir).join(&self.data_meg)
    }

    pub fn data_labeled_dir(&self) -> PathBuf {
        PathBuf::from(&self.basedir).join(&self.data_labeled)
    }

    pub fn report_dir(&self) -> PathBuf {
        PathBuf::from(&self.basedir).join(&self.report)
    }
}

/// gDCNN MEG-acquisition block
///
/// `eog_ch2` and `reject` are nullable in the document: an explicit `null`
/// disables the second horizontal-EOG check / amplitude rejection, which is
/// not the same as a threshold of zero.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MegSettings {
    pub vendor: String,
    pub system: String,
    pub location: String,
    pub experiment: String,
    pub ecg_ch: String,
    pub eog_ch1: String,
    pub eog_ch2: Option<String>,
    /// Peak-to-peak magnetometer rejection threshold in Tesla
    pub reject: Option<f64>,
    /// Power-line frequency and harmonics to notch, in Hz
    pub line_freqs: Vec<f64>,
}

impl Default for MegSettings {
    fn default() -> Self {
        Self {
            vendor: "4D".to_string(),
            system: "magnes3600wh".to_string(),
            location: "juelich".to_string(),
            experiment: "resting".to_string(),
            ecg_ch: "ECG 001".to_string(),
            eog_ch1: "EOG 001".to_string(),
            eog_ch2: Some("EOG 002".to_string()),
            reject: Some(4e-12),
            line_freqs: vec![50.0, 100.0, 150.0],
        }
    }
}

impl MegSettings {
    /// Whether the second horizontal-EOG check is active
    pub fn has_second_eog(&self) -> bool {
        self.eog_ch2.is_some()
    }
}

/// gDCNN ICA block: artifact-detection thresholds
///
/// Every scalar is nullable; `null` disables that check.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IcaSettings {
    /// CTPS significance threshold for cardiac components
    pub ecg_thresh_ctps: Option<f64>,
    /// Cross-correlation threshold against the ECG channel
    pub ecg_thresh_corr: Option<f64>,
    /// Cross-correlation threshold against the EOG channels
    pub eog_thresh_corr: Option<f64>,
}

impl Default for IcaSettings {
    fn default() -> Self {
        Self {
            ecg_thresh_ctps: Some(0.20),
            ecg_thresh_corr: Some(0.25),
            eog_thresh_corr: Some(0.20),
        }
    }
}

impl IcaSettings {
    /// Whether any artifact check is still enabled
    pub fn any_enabled(&self) -> bool {
        self.ecg_thresh_ctps.is_some()
            || self.ecg_thresh_corr.is_some()
            || self.eog_thresh_corr.is_some()
    }
}

// ============================================================================
// Preprocessing pipeline document
// ============================================================================

/// Preprocessing pipeline configuration: a global block plus one block per
/// stage. Stage blocks share the `run`/`save`/`overwrite`/`postfix` quartet.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PreprocConfig {
    pub global: PreprocGlobal,
    pub noise_reducer: NoiseReducerStage,
    pub suggest_bads: SuggestBadsStage,
    pub interpolate_bads: InterpolateBadsStage,
    pub filter: FilterStage,
    pub resample: ResampleStage,
    pub ica: IcaStage,
    pub report: ReportStage,
}

/// Pipeline global block: stage root, subjects and logging
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PreprocGlobal {
    /// Pipeline root directory holding per-subject recording directories
    pub stage: String,
    pub subjects: Vec<String>,
    /// Recording-name suffixes that identify processable files
    #[serde(alias = "file_extention")]
    pub file_extension: Vec<String>,
    pub recursive: bool,
    pub log2file: bool,
    pub logprefix: String,
    pub logoverwrite: bool,
}

impl Default for PreprocGlobal {
    fn default() -> Self {
        Self {
            stage: ".".to_string(),
            subjects: Vec::new(),
            file_extension: vec!["-raw.fif".to_string()],
            recursive: false,
            log2file: true,
            logprefix: "preproc".to_string(),
            logoverwrite: false,
        }
    }
}

/// Reference-channel noise reduction stage
///
/// Reference-filter contract: `reflp < refhp` is a band-stop, `reflp > refhp`
/// a band-pass, only `reflp` a low-pass, only `refhp` a high-pass; `refnotch`
/// lists explicit notch frequencies and combines with any of them. A runnable
/// stage needs at least one of the three.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NoiseReducerStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    /// Stage-specific suffix override; falls back to the global list
    #[serde(alias = "file_extention")]
    pub file_extension: Option<Vec<String>>,
    pub fmax: f64,
    pub reflp: Option<f64>,
    pub refhp: Option<f64>,
    pub refnotch: Vec<f64>,
    pub plot: bool,
    pub plot_dir: String,
}

impl Default for NoiseReducerStage {
    fn default() -> Self {
        Self {
            run: true,
            save: true,
            overwrite: false,
            postfix: "nr".to_string(),
            file_extension: None,
            fmax: 300.0,
            reflp: Some(5.0),
            refhp: Some(0.1),
            refnotch: vec![50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            plot: false,
            plot_dir: "report".to_string(),
        }
    }
}

/// Noisy/flat channel detection stage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SuggestBadsStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    pub fmax: f64,
    pub sensitivity_steps: u32,
    pub sensitivity_psd: u32,
}

impl Default for SuggestBadsStage {
    fn default() -> Self {
        Self {
            run: true,
            save: true,
            overwrite: false,
            postfix: "bcc".to_string(),
            fmax: 100.0,
            sensitivity_steps: 97,
            sensitivity_psd: 95,
        }
    }
}

/// Bad-channel interpolation stage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InterpolateBadsStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
}

impl Default for InterpolateBadsStage {
    fn default() -> Self {
        Self {
            run: true,
            save: true,
            overwrite: false,
            postfix: "int".to_string(),
        }
    }
}

/// Band-pass filter stage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FilterStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    pub flow: Option<f64>,
    pub fhigh: Option<f64>,
}

impl Default for FilterStage {
    fn default() -> Self {
        Self {
            run: false,
            save: true,
            overwrite: false,
            postfix: "fibp".to_string(),
            flow: Some(1.0),
            fhigh: Some(45.0),
        }
    }
}

/// Downsampling stage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResampleStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    pub sfreq: f64,
}

impl Default for ResampleStage {
    fn default() -> Self {
        Self {
            run: false,
            save: true,
            overwrite: false,
            postfix: "rs".to_string(),
            sfreq: 250.0,
        }
    }
}

/// ICA artifact-rejection stage (pipeline block, not the gDCNN document)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IcaStage {
    pub run: bool,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    pub flow: Option<f64>,
    pub fhigh: Option<f64>,
    pub ecg_ch: Option<String>,
    pub eog_ch: Option<String>,
}

impl Default for IcaStage {
    fn default() -> Self {
        Self {
            run: true,
            save: true,
            overwrite: false,
            postfix: "ar".to_string(),
            flow: Some(2.0),
            fhigh: Some(40.0),
            ecg_ch: Some("ECG 001".to_string()),
            eog_ch: Some("EOG 002".to_string()),
        }
    }
}

/// Report generation stage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReportStage {
    pub run: bool,
    pub overwrite: bool,
    pub image_format: String,
}

impl Default for ReportStage {
    fn default() -> Self {
        Self {
            run: true,
            overwrite: false,
            image_format: "png".to_string(),
        }
    }
}

// ============================================================================
// Grouping document
// ============================================================================

/// Label/band grouping document: group names mapped to ordered member lists.
///
/// Group order and member order follow the document; hemisphere-suffixed
/// labels (`-lh`/`-rh`) match their base member name during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingDoc {
    groups: Vec<(String, Vec<String>)>,
}

impl GroupingDoc {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn members(&self, group: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, members)| members.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_default_is_aligned() {
        let config = ConnectivityConfig::default();
        assert_eq!(config.fmin.len(), config.fmax.len());
        assert_eq!(config.fmin.len(), config.freqs.len());
        assert_eq!(config.fmin.len(), config.freq_band_names.len());
        assert_eq!(config.band_count(), 4);
    }

    #[test]
    fn test_connectivity_bands_iterator() {
        let config = ConnectivityConfig::default();
        let bands: Vec<_> = config.bands().collect();
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].name, "theta");
        assert_eq!(bands[0].fmin, 4.0);
        assert_eq!(bands[3].label, "31-45");
        assert_eq!(bands[3].fmax, 45.0);
    }

    #[test]
    fn test_missing_key_takes_default_explicit_null_is_none() {
        // Missing eog_ch2 falls back to the section default
        let meg: MegSettings = serde_yaml::from_str("vendor: \"CTF\"").unwrap();
        assert_eq!(meg.vendor, "CTF");
        assert_eq!(meg.eog_ch2.as_deref(), Some("EOG 002"));

        // Explicit null disables the check
        let meg: MegSettings = serde_yaml::from_str("eog_ch2: null").unwrap();
        assert!(meg.eog_ch2.is_none());
        assert!(!meg.has_second_eog());
    }

    #[test]
    fn test_reject_null_distinct_from_zero() {
        let meg: MegSettings = serde_yaml::from_str("reject: null").unwrap();
        assert!(meg.reject.is_none());

        let meg: MegSettings = serde_yaml::from_str("reject: 0.0").unwrap();
        assert_eq!(meg.reject, Some(0.0));
    }

    #[test]
    fn test_ica_thresholds_nullable() {
        let ica: IcaSettings =
            serde_yaml::from_str("ecg_thresh_corr: null\neog_thresh_corr: 0.3").unwrap();
        assert!(ica.ecg_thresh_corr.is_none());
        assert_eq!(ica.eog_thresh_corr, Some(0.3));
        assert!(ica.any_enabled());

        let ica: IcaSettings = serde_yaml::from_str(
            "ecg_thresh_ctps: null\necg_thresh_corr: null\neog_thresh_corr: null",
        )
        .unwrap();
        assert!(!ica.any_enabled());
    }

    #[test]
    fn test_legacy_extension_spelling_accepted() {
        let global: PreprocGlobal =
            serde_yaml::from_str("file_extention: [\"meeg-raw.fif\", \"rfDC-empty.fif\"]").unwrap();
        assert_eq!(global.file_extension.len(), 2);
        assert_eq!(global.file_extension[0], "meeg-raw.fif");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        // Lenient parsing: consumers may carry keys this loader does not model
        let config: PreprocConfig =
            serde_yaml::from_str("global:\n  stage: \"/data\"\n  epocher_template: \"x\"").unwrap();
        assert_eq!(config.global.stage, "/data");
    }

    #[test]
    fn test_stage_defaults_match_postfix_conventions() {
        let config = PreprocConfig::default();
        assert_eq!(config.noise_reducer.postfix, "nr");
        assert_eq!(config.suggest_bads.postfix, "bcc");
        assert_eq!(config.interpolate_bads.postfix, "int");
        assert_eq!(config.ica.postfix, "ar");
    }

    #[test]
    fn test_path_settings_join() {
        let path = PathSettings::default();
        assert!(path.data_meg_dir().ends_with("meg_rawdata"));
        assert!(path.report_dir().starts_with("/data/meg_store"));
    }

    #[test]
    fn test_grouping_doc_lookup() {
        let doc = GroupingDoc::new(vec![
            (
                "frontal".to_string(),
                vec!["superiorfrontal".to_string(), "frontalpole".to_string()],
            ),
            ("occipital".to_string(), vec!["cuneus".to_string()]),
        ]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.members("occipital").unwrap(), ["cuneus".to_string()]);
        assert!(doc.members("parietal").is_none());
        let names: Vec<_> = doc.group_names().collect();
        assert_eq!(names, ["frontal", "occipital"]);
    }
}
