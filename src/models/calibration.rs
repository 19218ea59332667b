//! Noise calibration.
//!
//! For a variable `j` with parents `p` and path coefficients `c_p`, all on the
//! standardized scale, the variance explained by the parents is
//!
//! ```text
//! explained(j) = Σ_p c_p² + Σ_{p<q} 2 · c_p · c_q · cov(p, q)
//! ```
//!
//! and the noise term needs scale `sqrt(1 - explained(j))` for `var(j) = 1`.
//! Parent covariances are propagated in generation order through
//!
//! ```text
//! cov(j, k) = Σ_p c_p · cov(p, k)      (k generated before j)
//! ```
//!
//! which is exact because each noise term is independent of everything
//! generated before it. This is closed form: one pass over the model.

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::models::structural::{Rule, StructuralModel, VarId};

/// Rounding slack for residual variances that should be exactly zero.
const RESIDUAL_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Calibration {
    noise_scales: Vec<f64>,
    explained: Vec<f64>,
    covariance: DMatrix<f64>,
}

impl Calibration {
    /// Noise multiplier for `id` (zero for pass-through variables).
    pub fn noise_scale(&self, id: VarId) -> f64 {
        self.noise_scales[id]
    }

    /// Share of `id`'s variance explained by its parents.
    pub fn explained(&self, id: VarId) -> f64 {
        self.explained[id]
    }

    pub fn residual_variance(&self, id: VarId) -> f64 {
        1.0 - self.explained[id]
    }

    /// Model-implied covariance between two variables (arena indices).
    pub fn covariance(&self, a: VarId, b: VarId) -> f64 {
        self.covariance[(a, b)]
    }

    pub fn covariance_matrix(&self) -> &DMatrix<f64> {
        &self.covariance
    }
}

/// Derive noise scales for every variable of `model`.
pub fn calibrate(model: &StructuralModel) -> Result<Calibration, ConfigurationError> {
    let n = model.len();
    let mut cov = DMatrix::<f64>::zeros(n, n);
    let mut noise_scales = vec![0.0; n];
    let mut explained = vec![0.0; n];
    let mut done: Vec<VarId> = Vec::with_capacity(n);

    for &j in model.generation_order() {
        let var = &model.variables()[j];

        let explained_j = match var.rule {
            Rule::Coin => 0.0,
            Rule::Linear | Rule::PassThrough => {
                let mut total = 0.0;
                for (a, (&p, &cp)) in var.parents.iter().zip(&var.coefficients).enumerate() {
                    total += cp * cp;
                    for (&q, &cq) in var.parents.iter().zip(&var.coefficients).skip(a + 1) {
                        total += 2.0 * cov[(p, q)] * cp * cq;
                    }
                }
                total
            }
        };
        let residual = 1.0 - explained_j;

        noise_scales[j] = match var.rule {
            Rule::Coin => 1.0,
            Rule::Linear => {
                if residual < -RESIDUAL_EPS {
                    return Err(ConfigurationError::NegativeResidualVariance {
                        variable: var.name.to_string(),
                        residual,
                    });
                }
                residual.max(0.0).sqrt()
            }
            Rule::PassThrough => {
                if residual.abs() > RESIDUAL_EPS {
                    return Err(ConfigurationError::PassThroughNotUnit {
                        variable: var.name.to_string(),
                        explained: explained_j,
                    });
                }
                0.0
            }
        };
        explained[j] = explained_j;

        cov[(j, j)] = 1.0;
        for &k in &done {
            let c: f64 = var
                .parents
                .iter()
                .zip(&var.coefficients)
                .map(|(&p, &cp)| cp * cov[(p, k)])
                .sum();
            cov[(j, k)] = c;
            cov[(k, j)] = c;
        }
        done.push(j);

        debug!(
            scenario = %model.scenario(),
            variable = var.name,
            explained = explained_j,
            noise_scale = noise_scales[j],
            "calibrated"
        );
    }

    Ok(Calibration {
        noise_scales,
        explained,
        covariance: cov,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scenario;
    use crate::models::scenarios::structural_model;

    #[test]
    fn reference_scenarios_calibrate() {
        let a = structural_model(Scenario::NoConfounding).unwrap();
        let cal = calibrate(&a).unwrap();
        let wt0 = a.index_of("wt0").unwrap();
        let wt1 = a.index_of("wt1").unwrap();
        let sex = a.index_of("sex").unwrap();
        let diet = a.index_of("diet").unwrap();

        assert!((cal.residual_variance(wt0) - 0.75).abs() < 1e-12);
        // 0.1² + 0.6² + 0.2² + 2(0.5·0.1·0.6 + 1·0.1·0.2 + 0.5·0.6·0.2) = 0.63
        assert!(
            (cal.residual_variance(wt1) - 0.37).abs() < 1e-12,
            "wt1 residual = {}",
            cal.residual_variance(wt1)
        );
        assert_eq!(cal.noise_scale(diet), 0.0);
        assert!((cal.covariance(sex, diet) - 1.0).abs() < 1e-12);
        // Total effect of sex on wt1: 0.1 + 0.2 + 0.6·0.5.
        assert!((cal.covariance(sex, wt1) - 0.6).abs() < 1e-12);

        let b = structural_model(Scenario::MediatorConfounding).unwrap();
        let cal = calibrate(&b).unwrap();
        let wt0 = b.index_of("wt0").unwrap();
        let wt1 = b.index_of("wt1").unwrap();
        assert!((cal.residual_variance(wt0) - 0.606).abs() < 1e-12);
        assert!(
            (cal.residual_variance(wt1) - 0.27).abs() < 1e-12,
            "wt1 residual = {}",
            cal.residual_variance(wt1)
        );
    }

    #[test]
    fn covariance_matrix_is_symmetric_with_unit_diagonal() {
        let b = structural_model(Scenario::MediatorConfounding).unwrap();
        let cal = calibrate(&b).unwrap();
        let m = cal.covariance_matrix();
        for i in 0..b.len() {
            assert!((m[(i, i)] - 1.0).abs() < 1e-12);
            for j in 0..b.len() {
                assert!((m[(i, j)] - m[(j, i)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn over_explained_variance_is_rejected() {
        let a = structural_model(Scenario::NoConfounding).unwrap();

        let bad = a.with_coefficient("sex", "wt0", 1.2).unwrap();
        let err = calibrate(&bad).unwrap_err();
        assert!(
            matches!(err, ConfigurationError::NegativeResidualVariance { ref variable, .. } if variable == "wt0"),
            "got {err:?}"
        );

        // Each path is < 1 on its own; only the covariance terms push wt1 over.
        let bad = a.with_coefficient("wt0", "wt1", 0.85).unwrap();
        let err = calibrate(&bad).unwrap_err();
        assert!(
            matches!(err, ConfigurationError::NegativeResidualVariance { ref variable, .. } if variable == "wt1"),
            "got {err:?}"
        );
    }

    #[test]
    fn over_explained_variance_is_rejected_in_mediator_scenario() {
        let b = structural_model(Scenario::MediatorConfounding).unwrap();

        // 0.3² + 0.9² + 2·0.3·0.9·0.6 = 1.224
        let bad = b.with_coefficient("height", "wt0", 0.9).unwrap();
        let err = calibrate(&bad).unwrap_err();
        match err {
            ConfigurationError::NegativeResidualVariance { variable, residual } => {
                assert_eq!(variable, "wt0");
                assert!((residual + 0.224).abs() < 1e-12, "residual = {residual}");
            }
            other => panic!("expected negative residual, got {other:?}"),
        }

        let bad = b.with_coefficient("height", "wt1", 0.7).unwrap();
        let err = calibrate(&bad).unwrap_err();
        assert!(
            matches!(err, ConfigurationError::NegativeResidualVariance { ref variable, .. } if variable == "wt1"),
            "got {err:?}"
        );
    }

    #[test]
    fn pass_through_must_carry_all_variance() {
        let a = structural_model(Scenario::NoConfounding).unwrap();
        let bad = a.with_coefficient("sex", "hall", 0.5).unwrap();
        let err = calibrate(&bad).unwrap_err();
        assert!(matches!(err, ConfigurationError::PassThroughNotUnit { .. }));
    }
}
