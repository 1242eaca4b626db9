// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # megprep-observability
//!
//! Logging setup for the megprep workspace.
//!
//! One call to [`init_logging`] wires up a console layer and, when file
//! logging is enabled, a non-blocking file layer writing into a timestamped
//! `run_YYYYMMDD_HHMMSS` directory under the log root. Old run directories
//! are cleaned up by a newest-N retention policy. [`DebugFlags`] translates
//! `--debug-<crate>` arguments and the `MEGPREP_DEBUG` list into a tracing
//! filter; an explicit `RUST_LOG` always wins.

pub mod cli;
pub mod init;

pub use cli::{debug_flags_help, parse_debug_flags, DebugFlags};
pub use init::{init_logging, init_logging_default, LoggingGuard};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Workspace crates known to the debug-flag layer
pub const KNOWN_CRATES: &[&str] = &[
    "megprep-config",
    "megprep-recordings",
    "megprep-pipeline",
    "megprep-observability",
    "megprep-runner",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_known_crates_cover_workspace() {
        assert!(KNOWN_CRATES.contains(&"megprep-config"));
        assert!(KNOWN_CRATES.contains(&"megprep-runner"));
    }
}
