//! Shared domain types.
//!
//! These are kept small, `Copy` where possible and serializable so they can be
//! passed through the driver, printed in tables and written to the JSON export.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which structural variant generates the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Variant A: sex affects baseline and follow-up weight, no mediator.
    NoConfounding,
    /// Variant B: height mediates sex -> weight and confounds baseline -> follow-up.
    MediatorConfounding,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::NoConfounding, Scenario::MediatorConfounding];

    /// Stable identifier used in file names and CSV columns.
    pub fn slug(self) -> &'static str {
        match self {
            Scenario::NoConfounding => "no_confounding",
            Scenario::MediatorConfounding => "mediator_confounding",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Scenario::NoConfounding => "A: no mediator-outcome confounding",
            Scenario::MediatorConfounding => "B: with mediator-outcome confounding",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Scenario selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioSet {
    A,
    B,
    Both,
}

impl ScenarioSet {
    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            ScenarioSet::A => vec![Scenario::NoConfounding],
            ScenarioSet::B => vec![Scenario::MediatorConfounding],
            ScenarioSet::Both => Scenario::ALL.to_vec(),
        }
    }
}

/// The fixed battery of estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    /// change ~ sex
    M1,
    /// wt1 ~ sex + wt0
    M2,
    /// g-computation of the total effect of sex on wt1
    M3,
    /// change ~ sex + wt0
    M4,
    /// wt1 ~ sex
    M5,
}

impl ModelId {
    pub const ALL: [ModelId; 5] = [ModelId::M1, ModelId::M2, ModelId::M3, ModelId::M4, ModelId::M5];

    pub fn code(self) -> &'static str {
        match self {
            ModelId::M1 => "m1",
            ModelId::M2 => "m2",
            ModelId::M3 => "m3",
            ModelId::M4 => "m4",
            ModelId::M5 => "m5",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ModelId::M1 => "change ~ sex",
            ModelId::M2 => "wt1 ~ sex + wt0",
            ModelId::M3 => "g-computation total effect on wt1",
            ModelId::M4 => "change ~ sex + wt0",
            ModelId::M5 => "wt1 ~ sex",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// How replicates are scheduled.
///
/// Both schedules are reproducible for a fixed seed, but they consume the
/// random stream differently and therefore give different (equally valid)
/// draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// One shared random stream, replicates in order.
    Sequential,
    /// One seed per replicate drawn up front, replicates on the rayon pool.
    Parallel,
}

/// Resolved run configuration (CLI args mapped to plain values).
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    pub scenarios: Vec<Scenario>,
    pub sample_size: usize,
    pub replicates: usize,
    pub seed: u64,
    pub schedule: Schedule,
    /// Decimal places kept in summary rows.
    pub precision: u32,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scenarios: Scenario::ALL.to_vec(),
            sample_size: 1000,
            replicates: 1000,
            seed: 1,
            schedule: Schedule::Sequential,
            precision: 2,
            plot: true,
            plot_width: 72,
            plot_height: 22,
            export_results: None,
            export_json: None,
            export_dir: None,
        }
    }
}
