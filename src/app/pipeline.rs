//! Shared "simulation pipeline" logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! calibrate -> replicate (sample + estimator battery) -> summarize
//!
//! The command handlers can then focus on presentation (tables, plots, exports).

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::data::{Dataset, DatasetSampler};
use crate::domain::{Scenario, SimConfig};
use crate::error::AppError;
use crate::models::{Calibration, Roles, StructuralModel, calibrate, structural_model};
use crate::report::{SummaryRow, summarize, validate_precision};
use crate::sim::EstimateMatrix;

/// One illustrative dataset (for plots and exports) with its variable roles.
#[derive(Debug, Clone)]
pub struct ScenarioSample {
    pub roles: Roles,
    pub data: Dataset,
}

/// All computed outputs of a single `lords simulate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub matrices: Vec<EstimateMatrix>,
    /// Summary rows, scenario by scenario, models in battery order.
    pub rows: Vec<SummaryRow>,
    /// Present only when a plot or a dataset export was requested.
    pub samples: Vec<ScenarioSample>,
}

/// Execute the full simulation and return the computed outputs.
pub fn run_simulation(config: &SimConfig) -> Result<RunOutput, AppError> {
    validate_precision(config.precision)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let matrices = crate::sim::run(
        &config.scenarios,
        config.sample_size,
        config.replicates,
        config.schedule,
        &mut rng,
    )?;

    let rows: Vec<SummaryRow> = matrices
        .iter()
        .flat_map(|m| summarize(m, config.precision))
        .collect();

    let samples = if config.plot || config.export_dir.is_some() {
        draw_samples(config)?
    } else {
        Vec::new()
    };

    Ok(RunOutput { matrices, rows, samples })
}

/// Draw one dataset per configured scenario.
///
/// Every scenario starts from a fresh `StdRng` seeded with `config.seed`, so
/// the dataset shown by `lords sample --seed S` is the first replicate of a
/// sequential `lords simulate --seed S` run for that scenario alone.
pub fn draw_samples(config: &SimConfig) -> Result<Vec<ScenarioSample>, AppError> {
    config
        .scenarios
        .iter()
        .map(|&scenario| -> Result<ScenarioSample, AppError> {
            let sampler = DatasetSampler::new(scenario)?;
            let mut rng = StdRng::seed_from_u64(config.seed);
            let data = sampler.sample(config.sample_size, &mut rng)?;
            debug!(scenario = %scenario, rows = data.n_rows(), "drew illustrative dataset");
            Ok(ScenarioSample {
                roles: *sampler.model().roles(),
                data,
            })
        })
        .collect()
}

/// Build and calibrate the reference model of each scenario.
pub fn calibrated_models(scenarios: &[Scenario]) -> Result<Vec<(StructuralModel, Calibration)>, AppError> {
    scenarios
        .iter()
        .map(|&scenario| -> Result<(StructuralModel, Calibration), AppError> {
            let model = structural_model(scenario)?;
            let calibration = calibrate(&model)?;
            Ok((model, calibration))
        })
        .collect()
}
