//! Reporting CLI: summary metrics and charts across evaluation runs.

use clap::Parser;
use drugrecall::{
    report::{discover_runs, format_summary_table, run_report},
    Config, RunSpec,
};
use std::path::PathBuf;

/// Summarize one or more results tables and draw comparison charts.
#[derive(Parser, Debug)]
#[command(name = "report")]
struct Args {
    /// Run to compare as NAME=PATH (repeatable). Overrides report.runs.
    #[arg(long = "run", value_name = "NAME=PATH")]
    runs: Vec<RunSpec>,

    /// Directory for the charts (and for --discover). Overrides report.results_dir.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Use every evaluation_metrics_<name>.csv found in the results directory.
    #[arg(long, conflicts_with = "runs")]
    discover: bool,

    /// Print the summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.drugrecall.log_level.as_str())
    ).init();
    config.log_source();

    let results_dir = args.results_dir.unwrap_or(config.report.results_dir);
    let specs = if args.discover {
        discover_runs(&results_dir)?
    } else if !args.runs.is_empty() {
        args.runs
    } else {
        config.report.runs
    };

    if specs.is_empty() {
        anyhow::bail!("No runs to report on in {}", results_dir.display());
    }

    let report = run_report(&specs, &results_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summaries)?);
    } else {
        print!("{}", format_summary_table(&report.summaries));
    }

    for path in report.charts.all() {
        log::info!("Chart: {}", path.display());
    }

    Ok(())
}
