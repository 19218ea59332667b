//! Parametric g-computation of the sex effect on follow-up weight with the
//! baseline held fixed and a post-exposure confounder left free to respond.
//!
//! The causal path is `exposure -> confounders -> baseline -> follow-up`, with
//! each confounder also pointing at the follow-up directly. Adjusting for the
//! baseline alone (m2) conditions on a collider of exposure and confounder;
//! here the confounders are modelled instead:
//!
//! ```text
//! confounder_k ~ exposure + confounder_1..k-1
//! follow_up    ~ exposure + baseline + confounders
//! ```
//!
//! For every unit we keep its fitted residuals (abduction), set the exposure
//! to 0 and to 1 and the baseline to `baseline_value` (action), push the
//! confounders down their chain and predict the follow-up (prediction). The
//! estimate is the mean of the unit-level differences.

use crate::error::EstimationError;
use crate::math::{LinearFit, fit_linear};

const MODEL: &str = "m3";

/// Residuals of `fit` on the observed regressors.
fn residuals(fit: &LinearFit, y: &[f64], regressors: &[&[f64]]) -> Vec<f64> {
    let mut row = vec![0.0; regressors.len()];
    (0..y.len())
        .map(|i| {
            for (slot, r) in row.iter_mut().zip(regressors) {
                *slot = r[i];
            }
            y[i] - fit.predict(&row)
        })
        .collect()
}

fn fit_node(y: &[f64], regressors: &[&[f64]]) -> Result<(LinearFit, Vec<f64>), EstimationError> {
    let fit = fit_linear(y, regressors).ok_or(if y.len() <= regressors.len() + 1 {
        EstimationError::TooFewRows {
            model: MODEL,
            rows: y.len(),
            columns: regressors.len() + 1,
        }
    } else {
        EstimationError::Singular { model: MODEL }
    })?;
    let resid = residuals(&fit, y, regressors);
    Ok((fit, resid))
}

/// Effect of a 0/1 exposure on `follow_up` with the baseline fixed at
/// `baseline_value` and `confounders` simulated under each exposure level.
pub fn g_computation(
    exposure: &[f64],
    baseline: &[f64],
    follow_up: &[f64],
    confounders: &[&[f64]],
    baseline_value: f64,
) -> Result<f64, EstimationError> {
    if !baseline_value.is_finite() {
        return Err(EstimationError::NonFinite { model: MODEL });
    }
    let n = exposure.len();

    // Confounder models, each on the exposure and the earlier confounders.
    let mut confounder_fits = Vec::with_capacity(confounders.len());
    for (k, c) in confounders.iter().enumerate() {
        let mut regs: Vec<&[f64]> = vec![exposure];
        regs.extend_from_slice(&confounders[..k]);
        confounder_fits.push(fit_node(c, &regs)?);
    }

    let mut regs: Vec<&[f64]> = vec![exposure, baseline];
    regs.extend_from_slice(confounders);
    let (outcome_fit, outcome_resid) = fit_node(follow_up, &regs)?;

    let counterfactual = |i: usize, a: f64| -> f64 {
        let mut c_values: Vec<f64> = Vec::with_capacity(confounders.len());
        for (fit, resid) in &confounder_fits {
            let mut x = vec![a];
            x.extend_from_slice(&c_values);
            c_values.push(fit.predict(&x) + resid[i]);
        }

        let mut x = vec![a, baseline_value];
        x.extend_from_slice(&c_values);
        outcome_fit.predict(&x) + outcome_resid[i]
    };

    let total: f64 = (0..n).map(|i| counterfactual(i, 1.0) - counterfactual(i, 0.0)).sum();
    let effect = total / n as f64;

    if effect.is_finite() {
        Ok(effect)
    } else {
        Err(EstimationError::NonFinite { model: MODEL })
    }
}
