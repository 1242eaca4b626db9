// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline stages and output naming

use serde::Serialize;
use std::fmt;

/// The preprocessing stages, in execution order.
///
/// Each variant corresponds to one block of the pipeline document; `key()`
/// returns that block's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NoiseReducer,
    SuggestBads,
    InterpolateBads,
    Filter,
    Resample,
    Ica,
    Report,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 7] = [
        Stage::NoiseReducer,
        Stage::SuggestBads,
        Stage::InterpolateBads,
        Stage::Filter,
        Stage::Resample,
        Stage::Ica,
        Stage::Report,
    ];

    /// Document block name of the stage
    pub fn key(&self) -> &'static str {
        match self {
            Stage::NoiseReducer => "noise_reducer",
            Stage::SuggestBads => "suggest_bads",
            Stage::InterpolateBads => "interpolate_bads",
            Stage::Filter => "filter",
            Stage::Resample => "resample",
            Stage::Ica => "ica",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Insert a stage postfix into an output file name.
///
/// The postfix lands before the terminal dash segment, comma-separated, so
/// chained stages accumulate: `x-raw.fif` -> `x,nr-raw.fif` ->
/// `x,nr,bcc-raw.fif`, and `x_c,rfDC,meeg-raw.fif` ->
/// `x_c,rfDC,meeg,nr-raw.fif`. A name without a dash gets the postfix before
/// its extension, or appended when there is none.
pub fn apply_postfix(name: &str, postfix: &str) -> String {
    let cut = name
        .rfind('-')
        .or_else(|| name.rfind('.'))
        .unwrap_or(name.len());
    format!("{},{}{}", &name[..cut], postfix, &name[cut..])
}
