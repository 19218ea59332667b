//! Machine-readable run summary (JSON).
//!
//! One file per run: the configuration that produced it, a timestamp, and one
//! record per (scenario, model) with either an interval or the reason there
//! is none.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ModelId, Scenario, SimConfig};
use crate::error::AppError;
use crate::report::{Interval, SummaryRow};

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord {
    pub scenario: Scenario,
    pub model: ModelId,
    pub description: &'static str,
    pub n_used: usize,
    pub n_missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SummaryRow> for SummaryRecord {
    fn from(row: &SummaryRow) -> Self {
        let (interval, error) = match &row.interval {
            Ok(iv) => (Some(*iv), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            scenario: row.scenario,
            model: row.model,
            description: row.model.description(),
            n_used: row.n_used,
            n_missing: row.n_missing,
            interval,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryFile<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub config: &'a SimConfig,
    pub results: Vec<SummaryRecord>,
}

impl<'a> SummaryFile<'a> {
    pub fn new(config: &'a SimConfig, rows: &[SummaryRow]) -> Self {
        Self {
            tool: "lords",
            generated_at: Utc::now(),
            config,
            results: rows.iter().map(SummaryRecord::from).collect(),
        }
    }
}

/// Write the run summary JSON.
pub fn write_summary_json(path: &Path, config: &SimConfig, rows: &[SummaryRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &SummaryFile::new(config, rows))
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}
