// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Configuration Document Checker

Validates a megprep YAML document: connectivity analysis, gDCNN artifact
labelling, or the preprocessing pipeline. The kind is auto-detected from
the document keys unless given explicitly.

Usage:
  cargo run --bin check_config -- <document.yaml> [connectivity|dcnn|preproc]

Example:
  cargo run --bin check_config -- config/connectivity.yaml
*/

use megprep_config::{
    detect_kind, validate_connectivity, validate_dcnn, validate_preproc, ConnectivityConfig,
    DcnnConfig, DocumentKind, PreprocConfig, RawDocument,
};
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!(
            "Usage: {} <document.yaml> [connectivity|dcnn|preproc]",
            args[0]
        );
        eprintln!("\nWithout a kind the document is auto-detected from its keys.");
        std::process::exit(1);
    }

    let input_path = &args[1];

    println!("📋 megprep Document Checker");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Document: {}", input_path);
    println!();

    if !Path::new(input_path).exists() {
        eprintln!("❌ Error: document '{}' not found", input_path);
        std::process::exit(1);
    }

    let content = fs::read_to_string(input_path)?;
    let raw = RawDocument::parse(&content)?;

    let kind = match args.get(2).map(String::as_str) {
        Some("connectivity") => DocumentKind::Connectivity,
        Some("dcnn") => DocumentKind::Dcnn,
        Some("preproc") => DocumentKind::Preproc,
        Some(other) => {
            eprintln!("❌ Error: unknown document kind '{}'", other);
            eprintln!("   Expected one of: connectivity, dcnn, preproc");
            std::process::exit(1);
        }
        None => match detect_kind(&raw) {
            Some(kind) => kind,
            None => {
                eprintln!("❌ Error: cannot detect the document kind; pass it explicitly");
                std::process::exit(1);
            }
        },
    };

    println!(
        "🔍 Validating as '{}' ({} top-level keys)...",
        kind,
        raw.len()
    );
    println!();

    let result = match kind {
        DocumentKind::Connectivity => {
            let config: ConnectivityConfig = raw.deserialize()?;
            println!("   Bands: {}", config.band_count());
            println!("   Methods: {}", config.con_methods.join(", "));
            validate_connectivity(&config)
        }
        DocumentKind::Dcnn => {
            let config: DcnnConfig = raw.deserialize()?;
            println!("   Device: {}", config.global.device);
            println!(
                "   System: {} {} ({})",
                config.meg.vendor, config.meg.system, config.meg.location
            );
            validate_dcnn(&config)
        }
        DocumentKind::Preproc => {
            let config: PreprocConfig = raw.deserialize()?;
            println!("   Stage root: {}", config.global.stage);
            validate_preproc(&config)
        }
    };

    println!();
    match result {
        Ok(()) => {
            println!("   ✅ Validation passed!");
            Ok(())
        }
        Err(err) => {
            println!("   ❌ {}", err);
            std::process::exit(1);
        }
    }
}
