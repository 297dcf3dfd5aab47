//! Per-disease recall of predicted drugs against the ground truth.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::eval::literal::DrugSet;
use crate::eval::table::{read_lookup, DrugLookup, GROUND_TRUTH_SCHEMA, PREDICTIONS_SCHEMA};

/// One row of the results table, per ground-truth disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    #[serde(rename = "DOID")]
    pub doid: String,
    pub num_gt: usize,
    pub num_pred: usize,
    pub num_matched: usize,
    /// num_matched / num_gt, or 0.0 when the ground truth is empty
    pub recall: f64,
    #[serde(with = "drug_list_column")]
    pub matched_drugs: Vec<String>,
}

impl EvaluationRow {
    /// Compare one disease's predicted drugs against its ground truth.
    pub fn compute(doid: &str, ground_truth: &DrugSet, predicted: &DrugSet) -> Self {
        let matched_drugs: Vec<String> = ground_truth.intersection(predicted).cloned().collect();
        let recall = if ground_truth.is_empty() {
            0.0
        } else {
            matched_drugs.len() as f64 / ground_truth.len() as f64
        };

        Self {
            doid: doid.to_string(),
            num_gt: ground_truth.len(),
            num_pred: predicted.len(),
            num_matched: matched_drugs.len(),
            recall,
            matched_drugs,
        }
    }

    /// At least one ground-truth drug was predicted.
    pub fn is_hit(&self) -> bool {
        self.num_matched > 0
    }

    /// Every ground-truth drug was predicted.
    pub fn is_perfect(&self) -> bool {
        self.recall == 1.0
    }
}

/// Evaluate every ground-truth disease against the predictions.
///
/// Diseases present only in the predictions are ignored. A disease with no
/// prediction counts as an empty prediction set.
pub fn evaluate(predictions: &DrugLookup, ground_truth: &DrugLookup) -> Vec<EvaluationRow> {
    let empty = DrugSet::new();
    ground_truth
        .iter()
        .map(|(doid, gt_drugs)| {
            let predicted = predictions.get(doid).unwrap_or(&empty);
            let row = EvaluationRow::compute(doid, gt_drugs, predicted);
            log::debug!(
                "{}: gt={} pred={} matched={} recall={:.3}",
                row.doid,
                row.num_gt,
                row.num_pred,
                row.num_matched,
                row.recall
            );
            row
        })
        .collect()
}

/// Write evaluation rows as CSV, creating the parent directory if needed.
pub fn write_results(path: &Path, rows: &[EvaluationRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(["DOID", "num_gt", "num_pred", "num_matched", "recall", "matched_drugs"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("Wrote {} evaluation rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a results table written by [`write_results`] (or an equivalent export).
pub fn read_results(path: &Path) -> Result<Vec<EvaluationRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    log::debug!("Read {} evaluation rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Full evaluator pipeline: read both tables, evaluate, persist.
///
/// Both tables are parsed completely before anything is written, so a
/// malformed cell leaves no output behind.
pub fn run_evaluation(
    predictions_path: &Path,
    ground_truth_path: &Path,
    output_path: &Path,
) -> Result<Vec<EvaluationRow>> {
    let predictions = read_lookup(predictions_path, PREDICTIONS_SCHEMA)?;
    let ground_truth = read_lookup(ground_truth_path, GROUND_TRUTH_SCHEMA)?;
    log::info!(
        "Evaluating {} ground-truth diseases against {} predicted diseases",
        ground_truth.len(),
        predictions.len()
    );

    let rows = evaluate(&predictions, &ground_truth);
    write_results(output_path, &rows)?;
    Ok(rows)
}

/// `matched_drugs` is stored as a list literal inside a single CSV cell.
mod drug_list_column {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::eval::literal::{format_drug_list, parse_drug_list};

    pub fn serialize<S: Serializer>(drugs: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_drug_list(drugs))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_drug_list(&text).map_err(D::Error::custom)
    }
}
