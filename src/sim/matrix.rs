//! Replicate-by-model estimate matrix.

use crate::domain::{ModelId, Scenario};
use crate::fit::EstimateRow;

/// Estimates for one scenario: one row per replicate, one column per model.
///
/// Rows are append-only. A failed estimator leaves `None` in its cell; the
/// rest of the row is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateMatrix {
    scenario: Scenario,
    models: Vec<ModelId>,
    rows: Vec<Vec<Option<f64>>>,
}

impl EstimateMatrix {
    pub fn new(scenario: Scenario, models: Vec<ModelId>) -> Self {
        Self {
            scenario,
            models,
            rows: Vec::new(),
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Append one replicate. Models missing from `row` are recorded as missing.
    pub fn push(&mut self, row: &EstimateRow) {
        let cells = self
            .models
            .iter()
            .map(|m| row.get(m).and_then(|r| r.as_ref().ok().copied()))
            .collect();
        self.rows.push(cells);
    }

    /// Append raw cells (one per model, in `models()` order).
    pub fn push_cells(&mut self, cells: Vec<Option<f64>>) {
        debug_assert_eq!(cells.len(), self.models.len());
        self.rows.push(cells);
    }

    fn column_index(&self, model: ModelId) -> Option<usize> {
        self.models.iter().position(|&m| m == model)
    }

    /// Non-missing values of one model column, in replicate order.
    pub fn column(&self, model: ModelId) -> Vec<f64> {
        let Some(j) = self.column_index(model) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|r| r[j]).collect()
    }

    pub fn missing(&self, model: ModelId) -> usize {
        let Some(j) = self.column_index(model) else {
            return 0;
        };
        self.rows.iter().filter(|r| r[j].is_none()).count()
    }
}
