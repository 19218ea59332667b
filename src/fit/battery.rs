//! The fixed battery of competing estimators.
//!
//! Every estimator answers "what is the effect of sex on weight?" and reports
//! the coefficient of the exposure term, with sex coded 0 = female, 1 = male
//! and weights in kg. They disagree because each encodes a different causal
//! assumption about the role of baseline weight.
//!
//! A failing estimator only loses its own cell; the others still run.

use std::collections::BTreeMap;

use tracing::warn;

use crate::data::Dataset;
use crate::domain::ModelId;
use crate::error::EstimationError;
use crate::fit::gcomp::g_computation;
use crate::math::fit_linear;
use crate::models::{GCompSpec, Roles, StructuralModel};

/// Per-model result of one battery run.
pub type EstimateRow = BTreeMap<ModelId, Result<f64, EstimationError>>;

#[derive(Debug, Clone)]
pub struct EstimatorBattery {
    roles: Roles,
    gcomp: Option<GCompSpec>,
}

impl EstimatorBattery {
    pub fn for_model(model: &StructuralModel) -> Self {
        Self {
            roles: *model.roles(),
            gcomp: model.gcomp().cloned(),
        }
    }

    /// Models that are structurally meaningful for this scenario.
    ///
    /// The g-computation estimator needs a post-exposure confounder, so it is
    /// only part of the battery when the scenario declares one.
    pub fn models(&self) -> Vec<ModelId> {
        ModelId::ALL
            .into_iter()
            .filter(|&m| m != ModelId::M3 || self.gcomp.is_some())
            .collect()
    }

    /// Fit every applicable model to `data`.
    pub fn fit_all(&self, data: &Dataset) -> EstimateRow {
        let mut out = EstimateRow::new();
        for model in self.models() {
            let result = self.fit_one(model, data);
            if let Err(e) = &result {
                warn!(scenario = %data.scenario(), model = model.code(), error = %e, "estimator failed");
            }
            out.insert(model, result);
        }
        out
    }

    pub fn fit_one(&self, model: ModelId, data: &Dataset) -> Result<f64, EstimationError> {
        let code = model.code();
        let col = |name: &str| {
            data.column(name).ok_or_else(|| EstimationError::MissingColumn {
                model: code,
                column: name.to_string(),
            })
        };

        let sex = data.exposure_indicator().ok_or_else(|| EstimationError::MissingColumn {
            model: code,
            column: data.exposure_name().to_string(),
        })?;
        let sex = sex.as_slice();
        let wt0 = col(self.roles.baseline)?;
        let wt1 = col(self.roles.follow_up)?;
        let change = col(self.roles.change)?;

        match model {
            ModelId::M1 => exposure_coefficient(code, change, &[sex]),
            ModelId::M2 => exposure_coefficient(code, wt1, &[sex, wt0]),
            ModelId::M3 => {
                let spec = self.gcomp.as_ref().ok_or_else(|| EstimationError::MissingColumn {
                    model: code,
                    column: "post-exposure confounder".to_string(),
                })?;
                let confounders = spec
                    .confounders
                    .iter()
                    .map(|&name| col(name))
                    .collect::<Result<Vec<_>, _>>()?;
                g_computation(sex, wt0, wt1, &confounders, spec.mediator_value)
            }
            ModelId::M4 => exposure_coefficient(code, change, &[sex, wt0]),
            ModelId::M5 => exposure_coefficient(code, wt1, &[sex]),
        }
    }
}

/// OLS of `y` on `regressors` (exposure first); returns the exposure slope.
fn exposure_coefficient(model: &'static str, y: &[f64], regressors: &[&[f64]]) -> Result<f64, EstimationError> {
    let columns = regressors.len() + 1;
    if y.len() <= columns {
        return Err(EstimationError::TooFewRows {
            model,
            rows: y.len(),
            columns,
        });
    }
    let fit = fit_linear(y, regressors).ok_or(EstimationError::Singular { model })?;
    let beta = fit.slope(0);
    if beta.is_finite() {
        Ok(beta)
    } else {
        Err(EstimationError::NonFinite { model })
    }
}
