//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation/estimation code stays clean and testable
//! - output changes are localized (and easy to pin in tests)

use crate::domain::{Scenario, SimConfig};
use crate::models::{Calibration, StructuralModel};
use crate::report::summary::SummaryRow;

/// Run header: scenarios, sizes, seed and schedule.
pub fn format_run_header(config: &SimConfig) -> String {
    let mut out = String::new();
    out.push_str("=== lords - Lord's paradox simulation ===\n");
    let names: Vec<&str> = config.scenarios.iter().map(|s| s.slug()).collect();
    out.push_str(&format!("Scenarios: {}\n", names.join(", ")));
    out.push_str(&format!(
        "Replicates: {} | n per replicate: {} | seed: {} | schedule: {:?}\n",
        config.replicates, config.sample_size, config.seed, config.schedule
    ));
    out
}

/// Summary table for one scenario, values shown with `precision` decimals.
pub fn format_summary(scenario: Scenario, rows: &[SummaryRow], precision: u32) -> String {
    let prec = precision as usize;
    let mut out = String::new();
    out.push_str(&format!("\nScenario {}\n", scenario.display_name()));

    out.push_str(
        format!(
            "{:<4} {:<36} {:>10} {:>10} {:>10} {:>6}\n",
            "id", "model", "2.5%", "median", "97.5%", "n"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<4} {:-<36} {:-<10} {:-<10} {:-<10} {:-<6}\n", "", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for row in rows.iter().filter(|r| r.scenario == scenario) {
        let line = match &row.interval {
            Ok(iv) => format!(
                "{:<4} {:<36} {:>10.prec$} {:>10.prec$} {:>10.prec$} {:>6}",
                row.model.code(),
                row.model.description(),
                iv.lower,
                iv.median,
                iv.upper,
                row.n_used
            ),
            Err(e) => format!(
                "{:<4} {:<36} {:>10} {:>10} {:>10} {:>6}  ({e})",
                row.model.code(),
                row.model.description(),
                "NA",
                "NA",
                "NA",
                row.n_used
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let missing: usize = rows
        .iter()
        .filter(|r| r.scenario == scenario)
        .map(|r| r.n_missing)
        .sum();
    if missing > 0 {
        out.push_str(&format!("({missing} estimate(s) failed and were recorded as missing)\n"));
    }

    out
}

/// Structural equations with their calibrated noise scales.
pub fn format_calibration(model: &StructuralModel, calibration: &Calibration) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nScenario {}\n", model.scenario().display_name()));

    for &id in model.generation_order() {
        let var = &model.variables()[id];
        let terms: Vec<String> = var
            .parents
            .iter()
            .zip(&var.coefficients)
            .map(|(&p, c)| format!("{c:.2}·{}", model.variables()[p].name))
            .collect();

        let rhs = if terms.is_empty() {
            "±1 (fair coin)".to_string()
        } else if var.rule.is_stochastic() {
            format!("{} + {:.4}·ε", terms.join(" + "), calibration.noise_scale(id))
        } else {
            terms.join(" + ")
        };
        out.push_str(&format!(
            "  {:<7} = {rhs}    [explained {:.4}]\n",
            var.name,
            calibration.explained(id)
        ));
    }

    out
}
