//! Aggregate recall metrics per run: macro, micro, hit rate, perfect rate.

use serde::Serialize;

use crate::error::{DrugrecallError, Result};
use crate::eval::EvaluationRow;
use crate::report::runs::Run;

/// Aggregate metrics of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub run: String,
    /// Mean of per-disease recall
    pub macro_recall: f64,
    /// Total matched / total ground truth
    pub micro_recall: f64,
    /// Fraction of diseases with at least one match
    pub hit_rate: f64,
    /// Fraction of diseases with recall exactly 1.0
    pub perfect_rate: f64,
}

/// Summarize one run's evaluation rows.
///
/// Returns [`DrugrecallError::ZeroGroundTruth`] when the run has no ground-truth
/// drugs at all, which also covers a run with no rows.
pub fn summarize(run: &str, rows: &[EvaluationRow]) -> Result<SummaryRow> {
    let total_gt: usize = rows.iter().map(|r| r.num_gt).sum();
    if total_gt == 0 {
        return Err(DrugrecallError::ZeroGroundTruth(run.to_string()));
    }
    let total_matched: usize = rows.iter().map(|r| r.num_matched).sum();
    let n = rows.len() as f64;

    Ok(SummaryRow {
        run: run.to_string(),
        macro_recall: rows.iter().map(|r| r.recall).sum::<f64>() / n,
        micro_recall: total_matched as f64 / total_gt as f64,
        hit_rate: rows.iter().filter(|r| r.is_hit()).count() as f64 / n,
        perfect_rate: rows.iter().filter(|r| r.is_perfect()).count() as f64 / n,
    })
}

/// Summarize every run, in order.
pub fn summarize_runs(runs: &[Run]) -> Result<Vec<SummaryRow>> {
    runs.iter().map(|run| summarize(&run.name, &run.rows)).collect()
}

/// Render summaries as a fixed-width text table.
pub fn format_summary_table(summaries: &[SummaryRow]) -> String {
    let name_width = summaries
        .iter()
        .map(|s| s.run.chars().count())
        .max()
        .unwrap_or(0)
        .max("run".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$} {:>12} {:>12} {:>10} {:>12}\n",
        "run",
        "macro_recall",
        "micro_recall",
        "hit_rate",
        "perfect_rate",
        width = name_width
    ));
    out.push_str(&format!("{:-<1$}\n", "", name_width + 50));
    for s in summaries {
        out.push_str(&format!(
            "{:<width$} {:>12.6} {:>12.6} {:>10.6} {:>12.6}\n",
            s.run,
            s.macro_recall,
            s.micro_recall,
            s.hit_rate,
            s.perfect_rate,
            width = name_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(doid: &str, num_gt: usize, num_matched: usize) -> EvaluationRow {
        EvaluationRow {
            doid: doid.to_string(),
            num_gt,
            num_pred: num_matched,
            num_matched,
            recall: if num_gt == 0 { 0.0 } else { num_matched as f64 / num_gt as f64 },
            matched_drugs: (0..num_matched).map(|i| format!("D{}", i)).collect(),
        }
    }

    #[test]
    fn summary_scenario() {
        let rows = vec![row("DOID:1", 2, 1), row("DOID:2", 1, 0)];
        let s = summarize("Top 30", &rows).unwrap();

        assert_eq!(s.run, "Top 30");
        assert!((s.macro_recall - 0.25).abs() < 1e-12);
        assert!((s.micro_recall - 1.0 / 3.0).abs() < 1e-12);
        assert!((s.hit_rate - 0.5).abs() < 1e-12);
        assert_eq!(s.perfect_rate, 0.0);
    }

    #[test]
    fn macro_and_micro_differ_with_unequal_sizes() {
        // one small perfect disease, one large missed disease
        let rows = vec![row("DOID:1", 1, 1), row("DOID:2", 9, 0)];
        let s = summarize("run", &rows).unwrap();

        assert!((s.macro_recall - 0.5).abs() < 1e-12);
        assert!((s.micro_recall - 0.1).abs() < 1e-12);
        assert!((s.perfect_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_ground_truth_is_an_error() {
        let rows = vec![row("DOID:1", 0, 0)];
        assert!(matches!(
            summarize("empty", &rows),
            Err(DrugrecallError::ZeroGroundTruth(ref run)) if run == "empty"
        ));
        assert!(summarize("no rows", &[]).is_err());
    }

    #[test]
    fn summarize_runs_propagates_first_failure() {
        let runs = vec![
            Run::new("ok", vec![row("DOID:1", 1, 1)]),
            Run::new("bad", vec![]),
        ];
        assert!(summarize_runs(&runs).is_err());
    }

    #[test]
    fn table_lists_every_run() {
        let summaries = vec![
            summarize("All drugs", &[row("DOID:1", 2, 2)]).unwrap(),
            summarize("Top 30", &[row("DOID:1", 2, 1)]).unwrap(),
        ];
        let table = format_summary_table(&summaries);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("run"));
        assert!(lines[0].contains("micro_recall"));
        assert!(lines[2].starts_with("All drugs"));
        assert!(lines[2].contains("1.000000"));
        assert!(lines[3].contains("0.500000"));
    }
}
