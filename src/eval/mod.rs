//! Recall evaluator: drug-set parsing, DOID normalization, per-disease recall.

pub mod doid;
pub mod evaluator;
pub mod literal;
pub mod table;

pub use doid::normalize_doid;
pub use evaluator::{evaluate, read_results, run_evaluation, write_results, EvaluationRow};
pub use literal::{format_drug_list, parse_drug_list, parse_drug_set, DrugSet};
pub use table::{read_lookup, read_records, DrugLookup, DrugRecord, TableSchema, GROUND_TRUTH_SCHEMA, PREDICTIONS_SCHEMA};
