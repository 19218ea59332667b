//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the replicate study or draws single datasets
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CalibrateArgs, Command, SimArgs};
use crate::domain::SimConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lords` binary.
pub fn run() -> Result<(), AppError> {
    // We want `lords` and `lords -n 500` to behave like `lords simulate ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Simulate(args) => handle_simulate(args),
        Command::Sample(args) => handle_sample(args),
        Command::Calibrate(args) => handle_calibrate(args),
    }
}

/// Log to stderr so tables and plots on stdout stay clean. `RUST_LOG` wins
/// over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_simulate(args: SimArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(&args);
    let run = pipeline::run_simulation(&config)?;

    println!("{}", crate::report::format_run_header(&config));
    for &scenario in &config.scenarios {
        println!("{}", crate::report::format_summary(scenario, &run.rows, config.precision));
    }

    if config.plot {
        print_plots(&run.samples, &config);
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.rows, config.precision)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::summary::write_summary_json(path, &config, &run.rows)?;
    }
    if let Some(dir) = &config.export_dir {
        let datasets: Vec<_> = run.samples.iter().map(|s| s.data.clone()).collect();
        crate::io::export::write_datasets(dir, &datasets)?;
    }

    Ok(())
}

fn handle_sample(args: SimArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(&args);
    let samples = pipeline::draw_samples(&config)?;

    for s in &samples {
        println!(
            "Scenario {}: {} rows [{}]",
            s.data.scenario().display_name(),
            s.data.n_rows(),
            s.data.column_names().join(", ")
        );
    }
    if config.plot {
        print_plots(&samples, &config);
    }

    if let Some(dir) = &config.export_dir {
        let datasets: Vec<_> = samples.into_iter().map(|s| s.data).collect();
        let paths = crate::io::export::write_datasets(dir, &datasets)?;
        for p in paths {
            println!("wrote {}", p.display());
        }
    }

    Ok(())
}

fn handle_calibrate(args: CalibrateArgs) -> Result<(), AppError> {
    let models = pipeline::calibrated_models(&args.scenario.scenarios())?;
    for (model, calibration) in &models {
        println!("{}", crate::report::format_calibration(model, calibration));
    }
    info!(scenarios = models.len(), "calibration ok");
    Ok(())
}

/// One panel per scenario, each drawn from that scenario's own dataset.
fn print_plots(samples: &[pipeline::ScenarioSample], config: &SimConfig) {
    for s in samples {
        let plot = crate::plot::render_ascii_plot(&s.data, &s.roles, config.plot_width, config.plot_height);
        println!("{plot}");
    }
}

pub fn sim_config_from_args(args: &SimArgs) -> SimConfig {
    SimConfig {
        scenarios: args.scenario.scenarios(),
        sample_size: args.sample_size,
        replicates: args.replicates,
        seed: args.seed,
        schedule: args.schedule,
        precision: args.precision,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export_results.clone(),
        export_json: args.export_json.clone(),
        export_dir: args.export_dir.clone(),
    }
}

/// Rewrite argv so `lords` defaults to `lords simulate`.
///
/// Rules:
/// - `lords`                          -> `lords simulate`
/// - `lords -n 500 ...`               -> `lords simulate -n 500 ...`
/// - `lords -v sample ...`            -> unchanged (`-v` is global)
/// - `lords --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv
        .iter()
        .skip(1)
        .find(|a| !matches!(a.as_str(), "-v" | "--verbose"))
        .cloned();

    let Some(first) = first else {
        argv.insert(1.min(argv.len()), "simulate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(first.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(first.as_str(), "simulate" | "sample" | "calibrate");
    if is_top_level_help_or_version || is_subcommand {
        return argv;
    }

    argv.insert(1, "simulate".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::Scenario;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_simulate() {
        assert_eq!(rewrite_args(argv(&["lords"])), argv(&["lords", "simulate"]));
        assert_eq!(rewrite_args(argv(&["lords", "-v"])), argv(&["lords", "simulate", "-v"]));
        assert_eq!(
            rewrite_args(argv(&["lords", "-n", "50"])),
            argv(&["lords", "simulate", "-n", "50"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["lords", "sample", "-n", "5"][..],
            &["lords", "-v", "calibrate"][..],
            &["lords", "--help"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn config_mirrors_args() {
        let cli = Cli::parse_from(rewrite_args(argv(&[
            "lords",
            "--scenario",
            "a",
            "--no-plot",
            "--export-dir",
            "out",
        ])));
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let config = sim_config_from_args(&args);
        assert_eq!(config.scenarios, vec![Scenario::NoConfounding]);
        assert!(!config.plot);
        assert_eq!(config.export_dir.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(config.replicates, 1000);
    }
}
