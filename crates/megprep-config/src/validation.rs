//! Configuration validation
//!
//! This module provides validation logic to ensure document values are
//! consistent, within valid ranges, and don't conflict with each other.
//! Parsing never validates; callers opt in per document kind.

use crate::{ConfigError, ConfigResult, ConnectivityConfig, DcnnConfig, PreprocConfig};

/// Validation errors that can occur during document validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    LengthMismatch {
        field: String,
        len: usize,
        expected_field: String,
        expected: usize,
    },
    BandOrder {
        index: usize,
        fmin: f64,
        fmax: f64,
    },
    MissingRequired {
        field: String,
    },
    DuplicateValue {
        field: String,
        value: String,
    },
    UnknownMode {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch {
                field,
                len,
                expected_field,
                expected,
            } => {
                write!(
                    f,
                    "Sequence {} has {} entries but {} has {}; parallel sequences must be index-aligned",
                    field, len, expected_field, expected
                )
            }
            Self::BandOrder { index, fmin, fmax } => {
                write!(
                    f,
                    "Band {}: fmin = {} must be below fmax = {}",
                    index, fmin, fmax
                )
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::DuplicateValue { field, value } => {
                write!(f, "Duplicate entry in {}: '{}'", field, value)
            }
            Self::UnknownMode {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "Unknown value for {}: '{}' (expected one of: {})",
                    field,
                    value,
                    allowed.join(", ")
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate a connectivity analysis document
///
/// Checks for:
/// - Parallel sequence alignment (`fmin`/`fmax`/`freqs`/`freq_band_names`)
/// - Band edge ordering (`fmin[i] < fmax[i]`) and non-negative edges
/// - Non-empty, duplicate-free `con_methods`
/// - Known `extract_mode` and `con_mode` values
/// - Envelope-correlation label pair alignment
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation found
pub fn validate_connectivity(config: &ConnectivityConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_band_sequences(config, &mut errors);
    validate_methods(config, &mut errors);
    validate_modes(config, &mut errors);

    finish("connectivity", errors)
}

/// Validate a gDCNN artifact-labelling document
pub fn validate_dcnn(config: &DcnnConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_dcnn_global(config, &mut errors);
    validate_dcnn_paths(config, &mut errors);
    validate_dcnn_meg(config, &mut errors);
    validate_dcnn_thresholds(config, &mut errors);

    finish("dcnn", errors)
}

/// Validate a preprocessing pipeline document
pub fn validate_preproc(config: &PreprocConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_preproc_global(config, &mut errors);
    validate_noise_reducer(config, &mut errors);
    validate_scalar_stages(config, &mut errors);
    validate_postfixes(config, &mut errors);

    finish("preproc", errors)
}

fn finish(kind: &str, errors: Vec<ConfigValidationError>) -> ConfigResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "{} document validation failed:\n{}",
        kind, error_messages
    )))
}

fn validate_band_sequences(config: &ConnectivityConfig, errors: &mut Vec<ConfigValidationError>) {
    let expected = config.fmin.len();
    for (field, len) in [
        ("fmax", config.fmax.len()),
        ("freqs", config.freqs.len()),
        ("freq_band_names", config.freq_band_names.len()),
    ] {
        if len != expected {
            errors.push(ConfigValidationError::LengthMismatch {
                field: field.to_string(),
                len,
                expected_field: "fmin".to_string(),
                expected,
            });
        }
    }

    for (index, (fmin, fmax)) in config.fmin.iter().zip(config.fmax.iter()).enumerate() {
        if fmin >= fmax {
            errors.push(ConfigValidationError::BandOrder {
                index,
                fmin: *fmin,
                fmax: *fmax,
            });
        }
        if *fmin < 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("fmin[{}]", index),
                reason: "band edges must be non-negative".to_string(),
            });
        }
    }

    if config.envcor_freqs.len() != config.envcor_band_names.len() {
        errors.push(ConfigValidationError::LengthMismatch {
            field: "envcor_band_names".to_string(),
            len: config.envcor_band_names.len(),
            expected_field: "envcor_freqs".to_string(),
            expected: config.envcor_freqs.len(),
        });
    }
}

fn validate_methods(config: &ConnectivityConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.con_methods.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "con_methods".to_string(),
        });
        return;
    }

    let mut seen = std::collections::HashSet::new();
    for method in &config.con_methods {
        if method.is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "con_methods".to_string(),
                reason: "estimator names must be non-empty strings".to_string(),
            });
            continue;
        }
        if !seen.insert(method.as_str()) {
            errors.push(ConfigValidationError::DuplicateValue {
                field: "con_methods".to_string(),
                value: method.clone(),
            });
        }
    }
}

fn validate_modes(config: &ConnectivityConfig, errors: &mut Vec<ConfigValidationError>) {
    if !ConnectivityConfig::EXTRACT_MODES.contains(&config.extract_mode.as_str()) {
        errors.push(ConfigValidationError::UnknownMode {
            field: "extract_mode".to_string(),
            value: config.extract_mode.clone(),
            allowed: ConnectivityConfig::EXTRACT_MODES,
        });
    }
    if !ConnectivityConfig::CON_MODES.contains(&config.con_mode.as_str()) {
        errors.push(ConfigValidationError::UnknownMode {
            field: "con_mode".to_string(),
            value: config.con_mode.clone(),
            allowed: ConnectivityConfig::CON_MODES,
        });
    }
}

fn validate_dcnn_global(config: &DcnnConfig, errors: &mut Vec<ConfigValidationError>) {
    const DEVICES: &[&str] = &["cpu", "gpu"];

    if config.global.version.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "global.version".to_string(),
        });
    }
    if !DEVICES.contains(&config.global.device.as_str()) {
        errors.push(ConfigValidationError::UnknownMode {
            field: "global.device".to_string(),
            value: config.global.device.clone(),
            allowed: DEVICES,
        });
    }
}

fn validate_dcnn_paths(config: &DcnnConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.path.basedir.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "path.basedir".to_string(),
        });
    }

    for (field, value) in [
        ("path.data_meg", &config.path.data_meg),
        ("path.data_labeled", &config.path.data_labeled),
        ("path.report", &config.path.report),
    ] {
        if value.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        } else if value.starts_with('/') {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must be relative to basedir".to_string(),
            });
        }
    }
}

fn validate_dcnn_meg(config: &DcnnConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, value) in [
        ("meg.vendor", &config.meg.vendor),
        ("meg.system", &config.meg.system),
        ("meg.ecg_ch", &config.meg.ecg_ch),
        ("meg.eog_ch1", &config.meg.eog_ch1),
    ] {
        if value.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
    }

    // Disabling the second EOG check is spelled `null`, not an empty name
    if config.meg.eog_ch2.as_deref() == Some("") {
        errors.push(ConfigValidationError::InvalidValue {
            field: "meg.eog_ch2".to_string(),
            reason: "must be a channel name or null".to_string(),
        });
    }

    if let Some(reject) = config.meg.reject {
        if reject <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "meg.reject".to_string(),
                reason: "rejection threshold must be positive (use null to disable)".to_string(),
            });
        }
    }

    if config.meg.line_freqs.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "meg.line_freqs".to_string(),
        });
    }
    for freq in &config.meg.line_freqs {
        if *freq <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "meg.line_freqs".to_string(),
                reason: format!("frequency {} must be positive", freq),
            });
        }
    }
    if config
        .meg
        .line_freqs
        .windows(2)
        .any(|pair| pair[0] >= pair[1])
    {
        errors.push(ConfigValidationError::InvalidValue {
            field: "meg.line_freqs".to_string(),
            reason: "frequencies must be strictly increasing".to_string(),
        });
    }
}

fn validate_dcnn_thresholds(config: &DcnnConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, value) in [
        ("ica.ecg_thresh_ctps", config.ica.ecg_thresh_ctps),
        ("ica.ecg_thresh_corr", config.ica.ecg_thresh_corr),
        ("ica.eog_thresh_corr", config.ica.eog_thresh_corr),
    ] {
        if let Some(threshold) = value {
            if threshold <= 0.0 || threshold > 1.0 {
                errors.push(ConfigValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "threshold must be in (0, 1] (use null to disable)".to_string(),
                });
            }
        }
    }
}

fn validate_preproc_global(config: &PreprocConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.global.stage.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "global.stage".to_string(),
        });
    }
    if config.global.file_extension.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "global.file_extension".to_string(),
        });
    }
    for suffix in &config.global.file_extension {
        if suffix.is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "global.file_extension".to_string(),
                reason: "suffixes must be non-empty".to_string(),
            });
        }
    }
}

fn validate_noise_reducer(config: &PreprocConfig, errors: &mut Vec<ConfigValidationError>) {
    let stage = &config.noise_reducer;
    if !stage.run {
        return;
    }

    if stage.reflp.is_none() && stage.refhp.is_none() && stage.refnotch.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "noise_reducer".to_string(),
            reason: "needs at least one of reflp, refhp or refnotch".to_string(),
        });
    }
    if let (Some(reflp), Some(refhp)) = (stage.reflp, stage.refhp) {
        if reflp == refhp {
            errors.push(ConfigValidationError::InvalidValue {
                field: "noise_reducer.reflp".to_string(),
                reason: "reflp and refhp must differ to form a band".to_string(),
            });
        }
    }
    for notch in &stage.refnotch {
        if *notch <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "noise_reducer.refnotch".to_string(),
                reason: format!("notch frequency {} must be positive", notch),
            });
        }
    }
    if stage.fmax <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "noise_reducer.fmax".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_scalar_stages(config: &PreprocConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.filter.run {
        if config.filter.flow.is_none() && config.filter.fhigh.is_none() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "filter".to_string(),
                reason: "needs at least one of flow or fhigh".to_string(),
            });
        }
        if let (Some(flow), Some(fhigh)) = (config.filter.flow, config.filter.fhigh) {
            if flow >= fhigh {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "filter.flow".to_string(),
                    reason: format!("flow = {} must be below fhigh = {}", flow, fhigh),
                });
            }
        }
    }

    if config.resample.run && config.resample.sfreq <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "resample.sfreq".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if config.ica.run {
        if let (Some(flow), Some(fhigh)) = (config.ica.flow, config.ica.fhigh) {
            if flow >= fhigh {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "ica.flow".to_string(),
                    reason: format!("flow = {} must be below fhigh = {}", flow, fhigh),
                });
            }
        }
    }

    if config.suggest_bads.run {
        for (field, value) in [
            (
                "suggest_bads.sensitivity_steps",
                config.suggest_bads.sensitivity_steps,
            ),
            (
                "suggest_bads.sensitivity_psd",
                config.suggest_bads.sensitivity_psd,
            ),
        ] {
            if value == 0 || value > 100 {
                errors.push(ConfigValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "sensitivity is a percentage in 1-100".to_string(),
                });
            }
        }
    }
}

fn validate_postfixes(config: &PreprocConfig, errors: &mut Vec<ConfigValidationError>) {
    let stages: [(&str, bool, bool, &str); 6] = [
        (
            "noise_reducer",
            config.noise_reducer.run,
            config.noise_reducer.save,
            &config.noise_reducer.postfix,
        ),
        (
            "suggest_bads",
            config.suggest_bads.run,
            config.suggest_bads.save,
            &config.suggest_bads.postfix,
        ),
        (
            "interpolate_bads",
            config.interpolate_bads.run,
            config.interpolate_bads.save,
            &config.interpolate_bads.postfix,
        ),
        (
            "filter",
            config.filter.run,
            config.filter.save,
            &config.filter.postfix,
        ),
        (
            "resample",
            config.resample.run,
            config.resample.save,
            &config.resample.postfix,
        ),
        ("ica", config.ica.run, config.ica.save, &config.ica.postfix),
    ];

    for (name, run, save, postfix) in stages {
        if run && save && postfix.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("{}.postfix", name),
            });
        }
    }
}
