//! CSV exports: sampled datasets and simulation summaries.
//!
//! The files are meant to be easy to consume in spreadsheets or R/pandas.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::{Dataset, exposure_label};
use crate::error::AppError;
use crate::report::SummaryRow;

fn create(path: &Path, what: &str) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_err(what: &str) -> impl Fn(std::io::Error) -> AppError + '_ {
    move |e| AppError::new(2, format!("Failed to write {what}: {e}"))
}

/// Write one dataset in reporting units; the exposure is written as its label.
pub fn write_dataset_csv(path: &Path, data: &Dataset) -> Result<(), AppError> {
    let mut file = create(path, "dataset CSV")?;
    let err = write_err("dataset CSV");

    let columns = data.columns();
    let header: Vec<&str> = columns.iter().map(|c| c.name).collect();
    writeln!(file, "{}", header.join(",")).map_err(&err)?;

    let exposure = data.exposure_name();
    for i in 0..data.n_rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                if c.name == exposure {
                    exposure_label(c.values[i]).to_string()
                } else {
                    format!("{:.4}", c.values[i])
                }
            })
            .collect();
        writeln!(file, "{}", cells.join(",")).map_err(&err)?;
    }

    file.flush().map_err(&err)?;
    Ok(())
}

/// Write one `dataset_<scenario>.csv` per dataset into `dir`.
pub fn write_datasets(dir: &Path, datasets: &[Dataset]) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut paths = Vec::with_capacity(datasets.len());
    for data in datasets {
        let path = dir.join(format!("dataset_{}.csv", data.scenario().slug()));
        write_dataset_csv(&path, data)?;
        info!(path = %path.display(), rows = data.n_rows(), "wrote dataset");
        paths.push(path);
    }
    Ok(paths)
}

/// Write the per-model simulation intervals. Unavailable summaries are `NA`.
pub fn write_results_csv(path: &Path, rows: &[SummaryRow], precision: u32) -> Result<(), AppError> {
    let mut file = create(path, "results CSV")?;
    let err = write_err("results CSV");
    let prec = precision as usize;

    writeln!(file, "scenario,model,description,lower,median,upper,n_used,n_missing").map_err(&err)?;

    for r in rows {
        let (lower, median, upper) = match &r.interval {
            Ok(iv) => (
                format!("{:.prec$}", iv.lower),
                format!("{:.prec$}", iv.median),
                format!("{:.prec$}", iv.upper),
            ),
            Err(_) => ("NA".to_string(), "NA".to_string(), "NA".to_string()),
        };
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            r.scenario.slug(),
            r.model.code(),
            r.model.description(),
            lower,
            median,
            upper,
            r.n_used,
            r.n_missing,
        )
        .map_err(&err)?;
    }

    file.flush().map_err(&err)?;
    info!(path = %path.display(), rows = rows.len(), "wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::data::sample;
    use crate::domain::{ModelId, Scenario};
    use crate::error::AggregationError;
    use crate::report::Interval;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lords-export-{}", std::process::id()));
        create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn dataset_csv_has_header_labels_and_all_rows() {
        let data = sample(Scenario::MediatorConfounding, 25, &mut StdRng::seed_from_u64(4)).unwrap();
        let path = temp_path("dataset.csv");
        write_dataset_csv(&path, &data).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "sex,height,wt0,hall,diet,wt1,change");
        assert_eq!(lines.len(), 26);
        for line in &lines[1..] {
            let first = line.split(',').next().unwrap();
            assert!(first == "male" || first == "female", "bad label in {line}");
            assert_eq!(line.split(',').count(), 7);
        }
    }

    #[test]
    fn results_csv_marks_unavailable_rows() {
        let rows = vec![
            SummaryRow {
                scenario: Scenario::NoConfounding,
                model: ModelId::M5,
                n_used: 10,
                n_missing: 0,
                interval: Ok(Interval {
                    lower: 10.0,
                    median: 12.25,
                    upper: 14.5,
                }),
            },
            SummaryRow {
                scenario: Scenario::NoConfounding,
                model: ModelId::M1,
                n_used: 0,
                n_missing: 0,
                interval: Err(AggregationError::TooFewValues {
                    model: "m1".to_string(),
                    available: 0,
                    required: 2,
                }),
            },
        ];
        let path = temp_path("results.csv");
        write_results_csv(&path, &rows, 2).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "scenario,model,description,lower,median,upper,n_used,n_missing");
        assert_eq!(lines[1], "no_confounding,m5,wt1 ~ sex,10.00,12.25,14.50,10,0");
        assert_eq!(lines[2], "no_confounding,m1,change ~ sex,NA,NA,NA,0,0");
    }
}
