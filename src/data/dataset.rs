//! In-memory simulated dataset.
//!
//! Columns are stored column-major because every consumer (regressions,
//! exports, plots) reads whole columns.

use crate::domain::Scenario;

/// Exposure label for a ±1 coded sex value.
pub fn exposure_label(value: f64) -> &'static str {
    if value > 0.0 { "male" } else { "female" }
}

/// 0/1 indicator (1 = male) for a ±1 coded sex value.
pub fn exposure_indicator(value: f64) -> f64 {
    if value > 0.0 { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub(crate) scenario: Scenario,
    pub(crate) n_rows: usize,
    pub(crate) exposure: &'static str,
    /// Model variables on the standardized scale, in generation order.
    pub(crate) standardized: Vec<Column>,
    /// Model variables in reporting units followed by derived columns.
    pub(crate) reported: Vec<Column>,
}

impl Dataset {
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn exposure_name(&self) -> &'static str {
        self.exposure
    }

    /// Column in reporting units (including derived columns).
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.reported
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Column on the standardized (pre-rescaling) scale.
    pub fn standardized(&self, name: &str) -> Option<&[f64]> {
        self.standardized
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.reported.iter().map(|c| c.name).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.reported
    }

    pub fn standardized_columns(&self) -> &[Column] {
        &self.standardized
    }

    /// Exposure as a 0/1 indicator (1 = male), the coding used by the estimators.
    /// `None` when the exposure column is absent.
    pub fn exposure_indicator(&self) -> Option<Vec<f64>> {
        self.column(self.exposure)
            .map(|v| v.iter().map(|&x| exposure_indicator(x)).collect())
    }
}
