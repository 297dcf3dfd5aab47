//! Summary reporter: aggregate metrics and charts over named evaluation runs.

pub mod charts;
pub mod runs;
pub mod summary;

pub use charts::{render_all, ChartPaths};
pub use runs::{common_doids, discover_runs, load_runs, Run, RunSpec};
pub use summary::{format_summary_table, summarize, summarize_runs, SummaryRow};

use std::path::Path;

use crate::error::Result;

/// Output of one reporter invocation
#[derive(Debug, Clone)]
pub struct Report {
    pub summaries: Vec<SummaryRow>,
    pub charts: ChartPaths,
}

/// Load the runs, summarize each one and render the charts into `results_dir`.
///
/// Every run is summarized before any chart is drawn, so a degenerate run
/// fails the report without leaving half the charts behind.
pub fn run_report(specs: &[RunSpec], results_dir: &Path) -> Result<Report> {
    let runs = load_runs(specs)?;
    let summaries = summarize_runs(&runs)?;
    let charts = render_all(results_dir, &runs, &summaries)?;
    Ok(Report { summaries, charts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrugrecallError;
    use crate::eval::{write_results, EvaluationRow};
    use tempfile::TempDir;

    fn row(doid: &str, num_gt: usize, num_matched: usize) -> EvaluationRow {
        EvaluationRow {
            doid: doid.to_string(),
            num_gt,
            num_pred: 30,
            num_matched,
            recall: if num_gt == 0 { 0.0 } else { num_matched as f64 / num_gt as f64 },
            matched_drugs: (0..num_matched).map(|i| format!("DB{:05}", i)).collect(),
        }
    }

    #[test]
    fn report_over_written_results() {
        let dir = TempDir::new().unwrap();
        let results_dir = dir.path().join("eval_results");
        let all = results_dir.join("evaluation_metrics_all.csv");
        let top30 = results_dir.join("evaluation_metrics_top30.csv");
        write_results(&all, &[row("DOID:1", 2, 2), row("DOID:2", 1, 1)]).unwrap();
        write_results(&top30, &[row("DOID:1", 2, 1), row("DOID:2", 1, 0)]).unwrap();

        let specs = vec![RunSpec::new("All drugs", &all), RunSpec::new("Top 30", &top30)];
        let report = run_report(&specs, &results_dir).unwrap();

        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.summaries[0].perfect_rate, 1.0);
        assert!((report.summaries[1].macro_recall - 0.25).abs() < 1e-12);
        assert!((report.summaries[1].micro_recall - 1.0 / 3.0).abs() < 1e-12);
        assert!(report.charts.all().iter().all(|p| p.exists()));
    }

    #[test]
    fn degenerate_run_fails_before_charts() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("evaluation_metrics_empty.csv");
        write_results(&empty, &[row("DOID:1", 0, 0)]).unwrap();

        let out = dir.path().join("charts");
        let result = run_report(&[RunSpec::new("empty", &empty)], &out);
        assert!(matches!(result, Err(DrugrecallError::ZeroGroundTruth(_))));
        assert!(!out.exists());
    }
}
