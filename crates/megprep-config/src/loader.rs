// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier loading system for the pipeline
//! document:
//! 1. YAML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The connectivity and gDCNN documents are loaded from explicit paths; only
//! the pipeline document participates in file discovery and the full cascade.

use crate::{ConfigError, ConfigResult, ConnectivityConfig, DcnnConfig, PreprocConfig};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn read_document<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

macro_rules! impl_document_io {
    ($ty:ty) => {
        impl $ty {
            /// Load the document from a file
            pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
                read_document(path.as_ref())
            }

            /// Serialize the document back to YAML
            pub fn to_yaml_string(&self) -> ConfigResult<String> {
                Ok(serde_yaml::to_string(self)?)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(serde_yaml::from_str(s)?)
            }
        }
    };
}

impl_document_io!(ConnectivityConfig);
impl_document_io!(DcnnConfig);
impl_document_io!(PreprocConfig);

/// Default pipeline document file name
pub const DEFAULT_CONFIG_FILE: &str = "megprep.yaml";

/// Find the pipeline configuration file under its default name.
///
/// Search order:
/// 1. `MEGPREP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./megprep.yaml`
/// 3. Parent directories (searches up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_named(DEFAULT_CONFIG_FILE)
}

/// Find a configuration file by name in the standard locations
pub fn find_config_file_named(name: &str) -> ConfigResult<PathBuf> {
    // 1. Check environment variable first
    if let Ok(env_path) = env::var("MEGPREP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by MEGPREP_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    // 2. Search in common locations
    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(name));

        // Search up to 5 levels for a project root
        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(name));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet MEGPREP_CONFIG_PATH environment variable to specify custom location.",
        name, search_list
    )))
}

/// Load the preprocessing pipeline document with all overrides applied
///
/// # Arguments
///
/// * `config_path` - Optional path to the document. If `None`, will search for it.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns an error if the file is not found or contains invalid YAML
pub fn load_preproc_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<PreprocConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: PreprocConfig = serde_yaml::from_str(&content)?;
    tracing::info!(path = %config_file.display(), "loaded pipeline document");

    // Apply overrides in order
    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Load a connectivity analysis document from an explicit path
pub fn load_connectivity_config(path: &Path) -> ConfigResult<ConnectivityConfig> {
    let config = ConnectivityConfig::from_path(path)?;
    tracing::info!(path = %path.display(), bands = config.band_count(), "loaded connectivity document");
    Ok(config)
}

/// Load a gDCNN document from an explicit path
///
/// Honors the `MEGPREP_DEVICE` environment variable as a compute-device
/// override.
pub fn load_dcnn_config(path: &Path) -> ConfigResult<DcnnConfig> {
    let mut config = DcnnConfig::from_path(path)?;
    if let Ok(value) = env::var("MEGPREP_DEVICE") {
        config.global.device = value;
    }
    tracing::info!(path = %path.display(), device = %config.global.device, "loaded gDCNN document");
    Ok(config)
}

/// Apply environment variable overrides to the pipeline document
///
/// Supported environment variables:
/// - `MEGPREP_STAGE` -> `global.stage`
/// - `MEGPREP_SUBJECTS` -> `global.subjects` (comma-separated)
/// - `MEGPREP_LOG2FILE` -> `global.log2file`
/// - `MEGPREP_LOGPREFIX` -> `global.logprefix`
pub fn apply_environment_overrides(config: &mut PreprocConfig) {
    if let Ok(value) = env::var("MEGPREP_STAGE") {
        config.global.stage = value;
    }
    if let Ok(value) = env::var("MEGPREP_SUBJECTS") {
        config.global.subjects = split_id_list(&value);
    }
    if let Ok(value) = env::var("MEGPREP_LOG2FILE") {
        config.global.log2file = parse_bool_flag(&value);
    }
    if let Ok(value) = env::var("MEGPREP_LOGPREFIX") {
        config.global.logprefix = value;
    }
}

/// Apply CLI argument overrides to the pipeline document
///
/// Recognized keys: `stage`, `subjects`, `recursive`, `log2file`,
/// `logprefix`, `logoverwrite`, and `<block>.run` for every stage block
/// plus `noise_reducer.plot`. Unrecognized keys are logged and skipped.
pub fn apply_cli_overrides(config: &mut PreprocConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        match key.as_str() {
            "stage" => config.global.stage = value.clone(),
            "subjects" => config.global.subjects = split_id_list(value),
            "recursive" => config.global.recursive = parse_bool_flag(value),
            "log2file" => config.global.log2file = parse_bool_flag(value),
            "logprefix" => config.global.logprefix = value.clone(),
            "logoverwrite" => config.global.logoverwrite = parse_bool_flag(value),
            "noise_reducer.run" => config.noise_reducer.run = parse_bool_flag(value),
            "noise_reducer.plot" => config.noise_reducer.plot = parse_bool_flag(value),
            "suggest_bads.run" => config.suggest_bads.run = parse_bool_flag(value),
            "interpolate_bads.run" => config.interpolate_bads.run = parse_bool_flag(value),
            "filter.run" => config.filter.run = parse_bool_flag(value),
            "resample.run" => config.resample.run = parse_bool_flag(value),
            "ica.run" => config.ica.run = parse_bool_flag(value),
            "report.run" => config.report.run = parse_bool_flag(value),
            other => {
                tracing::warn!(key = other, "unrecognized configuration override, skipping");
            }
        }
    }
}

/// Expand `~` and `$VAR`/`${VAR}` references in a document path value.
///
/// Unknown variables are left verbatim so the resulting path still points at
/// the offending text in error messages.
pub fn expand_path(raw: &str) -> PathBuf {
    let mut text = raw.to_string();

    if text == "~" || text.starts_with("~/") {
        if let Ok(home) = env::var("HOME") {
            text = format!("{}{}", home, &text[1..]);
        }
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let closed = braced && chars.peek() == Some(&'}');
        if closed {
            chars.next();
        }
        if name.is_empty() || (braced && !closed) {
            // Not a variable reference, reproduce the consumed text
            result.push('$');
            if braced {
                result.push('{');
            }
            result.push_str(&name);
            if closed {
                result.push('}');
            }
            continue;
        }
        match env::var(&name) {
            Ok(value) => result.push_str(&value),
            Err(_) => {
                if braced {
                    result.push_str(&format!("${{{name}}}"));
                } else {
                    result.push_str(&format!("${name}"));
                }
            }
        }
    }

    PathBuf::from(result)
}

fn split_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool_flag(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1" || value.to_lowercase() == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_megprep.yaml");
        File::create(&config_path).unwrap();

        env::set_var("MEGPREP_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("MEGPREP_CONFIG_PATH");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing_file() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("MEGPREP_CONFIG_PATH", "/nonexistent/megprep.yaml");
        let result = find_config_file();
        env::remove_var("MEGPREP_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_preproc_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let saved_stage = env::var("MEGPREP_STAGE").ok();
        env::remove_var("MEGPREP_STAGE");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("megprep.yaml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "global:").unwrap();
        writeln!(file, "  stage: \"/data/exp/MEG\"").unwrap();
        writeln!(file, "  subjects: ['203404', '205382']").unwrap();
        writeln!(file, "noise_reducer:").unwrap();
        writeln!(file, "  run: True").unwrap();
        writeln!(file, "  reflp: 5.").unwrap();

        let config = load_preproc_config(Some(&config_path), None).unwrap();

        assert_eq!(config.global.stage, "/data/exp/MEG");
        assert_eq!(config.global.subjects, ["203404", "205382"]);
        assert_eq!(config.noise_reducer.reflp, Some(5.0));
        // Unset keys keep their defaults
        assert_eq!(config.suggest_bads.postfix, "bcc");

        if let Some(value) = saved_stage {
            env::set_var("MEGPREP_STAGE", value);
        }
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = PreprocConfig::default();

        env::set_var("MEGPREP_STAGE", "/mnt/megdaw");
        env::set_var("MEGPREP_SUBJECTS", "101123, 109925");

        apply_environment_overrides(&mut config);

        env::remove_var("MEGPREP_STAGE");
        env::remove_var("MEGPREP_SUBJECTS");

        assert_eq!(config.global.stage, "/mnt/megdaw");
        assert_eq!(config.global.subjects, ["101123", "109925"]);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = PreprocConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("stage".to_string(), "/scratch/meg".to_string());
        cli_args.insert("filter.run".to_string(), "true".to_string());
        cli_args.insert("noise_reducer.run".to_string(), "false".to_string());
        cli_args.insert("bogus.key".to_string(), "1".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.global.stage, "/scratch/meg");
        assert!(config.filter.run);
        assert!(!config.noise_reducer.run);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        // CLI overrides take precedence over environment variables
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("megprep.yaml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "global:").unwrap();
        writeln!(file, "  stage: \"/from/file\"").unwrap();
        writeln!(file, "  logprefix: \"file\"").unwrap();

        env::set_var("MEGPREP_STAGE", "/from/env");
        env::set_var("MEGPREP_LOGPREFIX", "env");

        let mut cli_args = HashMap::new();
        cli_args.insert("stage".to_string(), "/from/cli".to_string());

        let config = load_preproc_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("MEGPREP_STAGE");
        env::remove_var("MEGPREP_LOGPREFIX");

        // CLI wins for stage, env wins for logprefix (no CLI override)
        assert_eq!(config.global.stage, "/from/cli");
        assert_eq!(config.global.logprefix, "env");
    }

    #[test]
    fn test_typed_from_str_and_back() {
        let config: ConnectivityConfig = "fmin: [4., 8.]\nfmax: [7., 12.]".parse().unwrap();
        assert_eq!(config.fmin, [4.0, 8.0]);

        let yaml = config.to_yaml_string().unwrap();
        let reparsed: ConnectivityConfig = yaml.parse().unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_load_connectivity_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("connectivity.yaml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "con_methods: ['coh', 'plv']").unwrap();
        writeln!(file, "fmin: [4., 8.]").unwrap();
        writeln!(file, "fmax: [7., 12.]").unwrap();
        writeln!(file, "freqs: ['4-7', '8-12']").unwrap();
        writeln!(file, "freq_band_names: ['theta', 'alpha']").unwrap();

        let config = load_connectivity_config(&path).unwrap();
        assert_eq!(config.con_methods, ["coh", "plv"]);
        assert_eq!(config.band_count(), 2);
    }

    #[test]
    fn test_load_dcnn_config_device_override() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("gdcnn.yaml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "global:").unwrap();
        writeln!(file, "  device: 'gpu'").unwrap();
        writeln!(file, "meg:").unwrap();
        writeln!(file, "  vendor: 'CTF'").unwrap();

        env::set_var("MEGPREP_DEVICE", "cpu");
        let config = load_dcnn_config(&path).unwrap();
        env::remove_var("MEGPREP_DEVICE");

        assert_eq!(config.global.device, "cpu");
        assert_eq!(config.meg.vendor, "CTF");
    }

    #[test]
    fn test_expand_path() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("MEGPREP_TEST_ROOT", "/data/megdaw");

        assert_eq!(
            expand_path("$MEGPREP_TEST_ROOT/exp/MEG"),
            PathBuf::from("/data/megdaw/exp/MEG")
        );
        assert_eq!(
            expand_path("${MEGPREP_TEST_ROOT}/exp"),
            PathBuf::from("/data/megdaw/exp")
        );
        // Unknown variables stay verbatim
        assert_eq!(
            expand_path("$MEGPREP_TEST_UNSET/exp"),
            PathBuf::from("$MEGPREP_TEST_UNSET/exp")
        );

        env::remove_var("MEGPREP_TEST_ROOT");
    }

    #[test]
    fn test_expand_path_home() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let saved_home = env::var("HOME").ok();
        env::set_var("HOME", "/home/meg");

        assert_eq!(expand_path("~/data"), PathBuf::from("/home/meg/data"));
        // Mid-path tilde is not a home reference
        assert_eq!(expand_path("/data/~x"), PathBuf::from("/data/~x"));

        match saved_home {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
    }
}
