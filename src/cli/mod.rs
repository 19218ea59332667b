//! Command-line parsing for the Lord's paradox simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the simulation/estimation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ScenarioSet, Schedule};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lords", version, about = "Lord's paradox Monte-Carlo simulator")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the replicate study and print simulation intervals for every model.
    Simulate(SimArgs),
    /// Draw a single dataset per scenario, plot it and optionally export it.
    Sample(SimArgs),
    /// Print the structural equations with their calibrated noise scales.
    Calibrate(CalibrateArgs),
}

/// Options shared by `simulate` and `sample`.
#[derive(Debug, Args, Clone)]
pub struct SimArgs {
    /// Which structural variant(s) to run.
    #[arg(long, value_enum, default_value_t = ScenarioSet::Both)]
    pub scenario: ScenarioSet,

    /// Rows per simulated dataset.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub sample_size: usize,

    /// Number of replicates.
    #[arg(long, default_value_t = 1000)]
    pub replicates: usize,

    /// Master random seed.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Replicate schedule.
    #[arg(long, value_enum, default_value_t = Schedule::Sequential)]
    pub schedule: Schedule,

    /// Decimal places in the summary.
    #[arg(long, default_value_t = 2)]
    pub precision: u32,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 22)]
    pub height: usize,

    /// Export the per-model summary to CSV.
    #[arg(long = "export-results", value_name = "CSV")]
    pub export_results: Option<PathBuf>,

    /// Export the run summary (config + intervals) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write one `dataset_<scenario>.csv` per scenario into this directory.
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Options for `calibrate`.
#[derive(Debug, Args, Clone)]
pub struct CalibrateArgs {
    /// Which structural variant(s) to show.
    #[arg(long, value_enum, default_value_t = ScenarioSet::Both)]
    pub scenario: ScenarioSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_defaults() {
        let cli = Cli::parse_from(["lords", "simulate"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.scenario, ScenarioSet::Both);
        assert_eq!(args.sample_size, 1000);
        assert_eq!(args.replicates, 1000);
        assert_eq!(args.seed, 1);
        assert_eq!(args.schedule, Schedule::Sequential);
        assert!(args.plot && !args.no_plot);
        assert!(!cli.verbose);
    }

    #[test]
    fn simulate_options_parse() {
        let cli = Cli::parse_from([
            "lords", "simulate", "--scenario", "b", "-n", "200", "--replicates", "30", "--schedule",
            "parallel", "--no-plot", "-v",
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.scenario, ScenarioSet::B);
        assert_eq!(args.sample_size, 200);
        assert_eq!(args.replicates, 30);
        assert_eq!(args.schedule, Schedule::Parallel);
        assert!(args.no_plot);
        assert!(cli.verbose);
    }
}
