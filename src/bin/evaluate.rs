//! Evaluation CLI: per-disease recall of predicted drugs against the test split.

use clap::Parser;
use drugrecall::{eval::format_drug_list, run_evaluation, Config};
use std::path::PathBuf;

/// Compare predicted drugs per disease against the ground truth and write the results table.
#[derive(Parser, Debug)]
#[command(name = "evaluate")]
struct Args {
    /// Predictions CSV (columns: Disease, Drugs). Overrides evaluate.predictions.
    #[arg(long)]
    predictions: Option<PathBuf>,

    /// Ground-truth CSV (columns: DOID, drugs). Overrides evaluate.ground_truth.
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Results CSV to write. Overrides evaluate.output.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.drugrecall.log_level.as_str())
    ).init();
    config.log_source();

    let predictions = args.predictions.unwrap_or(config.evaluate.predictions);
    let ground_truth = args.ground_truth.unwrap_or(config.evaluate.ground_truth);
    let output = args.output.unwrap_or(config.evaluate.output);

    log::info!("Predictions: {}", predictions.display());
    log::info!("Ground truth: {}", ground_truth.display());

    let rows = run_evaluation(&predictions, &ground_truth, &output)?;

    println!(
        "{:<16} {:>8} {:>8} {:>11} {:>8}  {}",
        "DOID", "num_gt", "num_pred", "num_matched", "recall", "matched_drugs"
    );
    println!("{:-<80}", "");
    for row in &rows {
        println!(
            "{:<16} {:>8} {:>8} {:>11} {:>8.4}  {}",
            row.doid,
            row.num_gt,
            row.num_pred,
            row.num_matched,
            row.recall,
            format_drug_list(&row.matched_drugs)
        );
    }
    println!("{:-<80}", "");

    let hits = rows.iter().filter(|r| r.is_hit()).count();
    println!(
        "{} diseases, {} with at least one recovered drug. Results written to {}",
        rows.len(),
        hits,
        output.display()
    );

    Ok(())
}
