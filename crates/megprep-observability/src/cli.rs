// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Debug flag parsing for megprep binaries

use std::collections::HashSet;
use std::env;

/// Per-crate debug flags parsed from CLI arguments and environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugFlags {
    enabled: HashSet<String>,
    all: bool,
}

impl DebugFlags {
    /// Parse `--debug-all` / `--debug-<crate>` flags from raw arguments.
    ///
    /// Bare names get the `megprep-` prefix, so `--debug-config` and
    /// `--debug-megprep-config` are equivalent.
    pub fn from_args(args: &[String]) -> Self {
        let mut flags = Self::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.all = true;
            } else if let Some(name) = arg.strip_prefix("--debug-") {
                flags.enabled.insert(normalize_crate_name(name));
            }
        }
        flags
    }

    /// Merge names from the `MEGPREP_DEBUG` list (comma-separated; `all`
    /// enables everything)
    pub fn merge_env(&mut self) {
        if let Ok(value) = env::var("MEGPREP_DEBUG") {
            for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if name == "all" {
                    self.all = true;
                } else {
                    self.enabled.insert(normalize_crate_name(name));
                }
            }
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.all || self.enabled.contains(crate_name)
    }

    /// Build the tracing filter directive string
    pub fn to_filter_string(&self) -> String {
        if self.all {
            return "debug".to_string();
        }
        let mut directives = vec!["info".to_string()];
        let mut names: Vec<&String> = self.enabled.iter().collect();
        names.sort();
        for name in names {
            // Filter targets are module paths, so dashes become underscores
            directives.push(format!("{}=debug", name.replace('-', "_")));
        }
        directives.join(",")
    }
}

/// Parse debug flags from arguments plus the `MEGPREP_DEBUG` environment list
pub fn parse_debug_flags(args: &[String]) -> DebugFlags {
    let mut flags = DebugFlags::from_args(args);
    flags.merge_env();
    flags
}

fn normalize_crate_name(name: &str) -> String {
    if name.starts_with("megprep-") {
        name.to_string()
    } else {
        format!("megprep-{}", name)
    }
}

/// Usage text for the debug flags
pub fn debug_flags_help() -> String {
    let mut help =
        String::from("Debug flags:\n  --debug-all            Enable debug logging everywhere\n");
    for name in crate::KNOWN_CRATES {
        let short = name.strip_prefix("megprep-").unwrap_or(name);
        help.push_str(&format!(
            "  --debug-{:<14} Enable debug logging for {}\n",
            short, name
        ));
    }
    help.push_str("\nEnvironment: MEGPREP_DEBUG=<name,name,...|all>\n");
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_args_normalizes_names() {
        let flags = DebugFlags::from_args(&args(&["--debug-config", "--debug-megprep-pipeline"]));

        assert!(flags.is_enabled("megprep-config"));
        assert!(flags.is_enabled("megprep-pipeline"));
        assert!(!flags.is_enabled("megprep-runner"));
    }

    #[test]
    fn test_debug_all() {
        let flags = DebugFlags::from_args(&args(&["--debug-all"]));
        assert!(flags.is_enabled("megprep-config"));
        assert_eq!(flags.to_filter_string(), "debug");
    }

    #[test]
    fn test_filter_string_uses_underscore_targets() {
        let flags = DebugFlags::from_args(&args(&["--debug-pipeline", "--debug-config"]));

        assert_eq!(
            flags.to_filter_string(),
            "info,megprep_config=debug,megprep_pipeline=debug"
        );
    }

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(DebugFlags::default().to_filter_string(), "info");
    }

    #[test]
    fn test_env_list_merges() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("MEGPREP_DEBUG", "recordings, runner");

        let flags = parse_debug_flags(&args(&["--debug-config"]));
        env::remove_var("MEGPREP_DEBUG");

        assert!(flags.is_enabled("megprep-config"));
        assert!(flags.is_enabled("megprep-recordings"));
        assert!(flags.is_enabled("megprep-runner"));
    }

    #[test]
    fn test_env_all() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("MEGPREP_DEBUG", "all");

        let flags = parse_debug_flags(&[]);
        env::remove_var("MEGPREP_DEBUG");

        assert!(flags.is_enabled("megprep-pipeline"));
    }

    #[test]
    fn test_help_lists_known_crates() {
        let help = debug_flags_help();
        for name in crate::KNOWN_CRATES {
            assert!(help.contains(name), "missing {}", name);
        }
    }
}
