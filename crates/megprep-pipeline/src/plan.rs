// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stage plans resolved from the pipeline document

use crate::stage::{apply_postfix, Stage};
use megprep_config::PreprocConfig;
use serde::Serialize;

/// Three-layer value cascade for shared stage keys.
///
/// An explicit option beats the stage block, the stage block beats the global
/// block. Layers are `Option`s so an explicit `false` still wins over a
/// `true` further down.
pub fn resolve_value<'a, T: ?Sized>(
    explicit: Option<&'a T>,
    block: Option<&'a T>,
    global: &'a T,
) -> &'a T {
    explicit.or(block).unwrap_or(global)
}

/// Reference-channel filter resolved from the noise-reducer edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceFilter {
    /// `reflp < refhp`: stop band between the edges
    BandStop { stop_low: f64, stop_high: f64 },
    /// `reflp > refhp`: pass band between the edges
    BandPass { pass_low: f64, pass_high: f64 },
    /// Only `reflp` set
    LowPass { cutoff: f64 },
    /// Only `refhp` set
    HighPass { cutoff: f64 },
}

impl ReferenceFilter {
    /// Resolve the filter kind from the configured edges.
    ///
    /// Equal edges and two absent edges resolve to no filter; validation
    /// rejects both for a runnable stage unless `refnotch` covers it.
    pub fn from_edges(reflp: Option<f64>, refhp: Option<f64>) -> Option<Self> {
        match (reflp, refhp) {
            (Some(lp), Some(hp)) if lp < hp => Some(Self::BandStop {
                stop_low: lp,
                stop_high: hp,
            }),
            (Some(lp), Some(hp)) if lp > hp => Some(Self::BandPass {
                pass_low: hp,
                pass_high: lp,
            }),
            (Some(_), Some(_)) => None,
            (Some(lp), None) => Some(Self::LowPass { cutoff: lp }),
            (None, Some(hp)) => Some(Self::HighPass { cutoff: hp }),
            (None, None) => None,
        }
    }
}

/// Stage-specific parameters carried by a planned stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageDetail {
    NoiseReducer {
        fmax: f64,
        reference: Option<ReferenceFilter>,
        refnotch: Vec<f64>,
        plot: bool,
        plot_dir: String,
    },
    SuggestBads {
        fmax: f64,
        sensitivity_steps: u32,
        sensitivity_psd: u32,
    },
    InterpolateBads,
    Filter {
        flow: Option<f64>,
        fhigh: Option<f64>,
    },
    Resample {
        sfreq: f64,
    },
    Ica {
        flow: Option<f64>,
        fhigh: Option<f64>,
        ecg_ch: Option<String>,
        eog_ch: Option<String>,
    },
    Report {
        image_format: String,
    },
}

/// One enabled stage with its resolved parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStage {
    pub stage: Stage,
    pub save: bool,
    pub overwrite: bool,
    pub postfix: String,
    /// Stage-specific suffix override; `None` falls back to the global list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<Vec<String>>,
    pub detail: StageDetail,
}

/// Ordered list of enabled stages, resolved from a pipeline document.
///
/// Disabled (`run: False`) blocks are excluded; order follows [`Stage::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePlan {
    stages: Vec<PlannedStage>,
    file_extension: Vec<String>,
}

impl StagePlan {
    pub fn from_config(config: &PreprocConfig) -> Self {
        let mut stages = Vec::new();

        if config.noise_reducer.run {
            let block = &config.noise_reducer;
            stages.push(PlannedStage {
                stage: Stage::NoiseReducer,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: block.file_extension.clone(),
                detail: StageDetail::NoiseReducer {
                    fmax: block.fmax,
                    reference: ReferenceFilter::from_edges(block.reflp, block.refhp),
                    refnotch: block.refnotch.clone(),
                    plot: block.plot,
                    plot_dir: block.plot_dir.clone(),
                },
            });
        }

        if config.suggest_bads.run {
            let block = &config.suggest_bads;
            stages.push(PlannedStage {
                stage: Stage::SuggestBads,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: None,
                detail: StageDetail::SuggestBads {
                    fmax: block.fmax,
                    sensitivity_steps: block.sensitivity_steps,
                    sensitivity_psd: block.sensitivity_psd,
                },
            });
        }

        if config.interpolate_bads.run {
            let block = &config.interpolate_bads;
            stages.push(PlannedStage {
                stage: Stage::InterpolateBads,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: None,
                detail: StageDetail::InterpolateBads,
            });
        }

        if config.filter.run {
            let block = &config.filter;
            stages.push(PlannedStage {
                stage: Stage::Filter,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: None,
                detail: StageDetail::Filter {
                    flow: block.flow,
                    fhigh: block.fhigh,
                },
            });
        }

        if config.resample.run {
            let block = &config.resample;
            stages.push(PlannedStage {
                stage: Stage::Resample,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: None,
                detail: StageDetail::Resample { sfreq: block.sfreq },
            });
        }

        if config.ica.run {
            let block = &config.ica;
            stages.push(PlannedStage {
                stage: Stage::Ica,
                save: block.save,
                overwrite: block.overwrite,
                postfix: block.postfix.clone(),
                file_extension: None,
                detail: StageDetail::Ica {
                    flow: block.flow,
                    fhigh: block.fhigh,
                    ecg_ch: block.ecg_ch.clone(),
                    eog_ch: block.eog_ch.clone(),
                },
            });
        }

        if config.report.run {
            stages.push(PlannedStage {
                stage: Stage::Report,
                save: false,
                overwrite: config.report.overwrite,
                postfix: String::new(),
                file_extension: None,
                detail: StageDetail::Report {
                    image_format: config.report.image_format.clone(),
                },
            });
        }

        Self {
            stages,
            file_extension: config.global.file_extension.clone(),
        }
    }

    pub fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Global recording-suffix list
    pub fn suffixes(&self) -> &[String] {
        &self.file_extension
    }

    /// Suffix list in effect for one planned stage
    pub fn stage_suffixes<'a>(&'a self, planned: &'a PlannedStage) -> &'a [String] {
        resolve_value(
            None,
            planned.file_extension.as_deref(),
            self.file_extension.as_slice(),
        )
    }

    /// Final output name after all saving stages, postfixes chained in order
    pub fn output_name(&self, input: &str) -> String {
        let mut name = input.to_string();
        for planned in &self.stages {
            if planned.save && !planned.postfix.is_empty() {
                name = apply_postfix(&name, &planned.postfix);
            }
        }
        name
    }
}
