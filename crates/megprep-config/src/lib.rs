// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # megprep Configuration Documents
//!
//! Type-safe loader for the YAML documents that parameterize MEG
//! preprocessing, with support for:
//! - Connectivity analysis documents (frequency bands, estimators)
//! - gDCNN artifact-labelling documents (paths, acquisition, ICA thresholds)
//! - Preprocessing pipeline documents (per-stage blocks)
//! - Environment variable and CLI argument overrides
//! - Structural validation separate from parsing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use megprep_config::{load_preproc_config, validate_preproc};
//!
//! // Load the pipeline document with automatic file discovery and overrides
//! let config = load_preproc_config(None, None).expect("Failed to load config");
//! validate_preproc(&config).expect("Invalid pipeline document");
//!
//! // Access type-safe configuration values
//! println!("Stage root: {}", config.global.stage);
//! println!("Subjects: {}", config.global.subjects.len());
//! ```
//!
//! Parsing is deliberately lenient (unknown keys ignored, missing keys take
//! section defaults, no schema enforcement); validation is a separate,
//! explicit step so a document can be inspected even when it is defective.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod document;
pub mod loader;
pub mod types;
pub mod validation;

pub use document::{detect_kind, DocumentKind, RawDocument};
pub use loader::{
    apply_cli_overrides, apply_environment_overrides, expand_path, find_config_file,
    find_config_file_named, load_connectivity_config, load_dcnn_config, load_preproc_config,
    DEFAULT_CONFIG_FILE,
};
pub use types::*;
pub use validation::{
    validate_connectivity, validate_dcnn, validate_preproc, ConfigValidationError,
};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_types_compile() {
        // Smoke test to ensure types are properly defined
        let _connectivity = ConnectivityConfig::default();
        let _dcnn = DcnnConfig::default();
        let _preproc = PreprocConfig::default();
    }

    #[test]
    fn test_yaml_error_maps_to_parse_error() {
        let err = serde_yaml::from_str::<ConnectivityConfig>(": not yaml :")
            .map_err(ConfigError::from)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
