//! Reduce estimate matrices to simulation intervals.
//!
//! For every model column we report the 2.5th, 50th and 97.5th percentiles of
//! the non-missing estimates (linear interpolation between order statistics,
//! see `math::quantile`), rounded to a fixed number of decimals.

use serde::Serialize;

use crate::domain::{ModelId, Scenario};
use crate::error::{AggregationError, ConfigurationError};
use crate::math::{percentile_sorted, round_to};
use crate::sim::EstimateMatrix;

pub const LOWER_P: f64 = 0.025;
pub const UPPER_P: f64 = 0.975;

/// Fewer non-missing estimates than this cannot give a meaningful interval.
pub const MIN_SUMMARY_VALUES: usize = 2;

/// Upper bound on `precision` (beyond this rounding is meaningless for f64).
pub const MAX_PRECISION: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub scenario: Scenario,
    pub model: ModelId,
    /// Non-missing estimates that went into the interval.
    pub n_used: usize,
    pub n_missing: usize,
    pub interval: Result<Interval, AggregationError>,
}

pub fn validate_precision(precision: u32) -> Result<(), ConfigurationError> {
    if precision > MAX_PRECISION {
        return Err(ConfigurationError::Precision {
            got: precision,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

/// One row per model column of `matrix`, in column order.
pub fn summarize(matrix: &EstimateMatrix, precision: u32) -> Vec<SummaryRow> {
    matrix
        .models()
        .iter()
        .map(|&model| {
            let mut values = matrix.column(model);
            values.retain(|v| v.is_finite());
            values.sort_by(f64::total_cmp);

            let interval = if values.len() < MIN_SUMMARY_VALUES {
                Err(AggregationError::TooFewValues {
                    model: model.code().to_string(),
                    available: values.len(),
                    required: MIN_SUMMARY_VALUES,
                })
            } else {
                let q = |p: f64| percentile_sorted(&values, p).map(|v| round_to(v, precision));
                match (q(LOWER_P), q(0.5), q(UPPER_P)) {
                    (Some(lower), Some(median), Some(upper)) => Ok(Interval { lower, median, upper }),
                    _ => Err(AggregationError::TooFewValues {
                        model: model.code().to_string(),
                        available: values.len(),
                        required: MIN_SUMMARY_VALUES,
                    }),
                }
            };

            SummaryRow {
                scenario: matrix.scenario(),
                model,
                n_used: values.len(),
                n_missing: matrix.len() - values.len(),
                interval,
            }
        })
        .collect()
}
