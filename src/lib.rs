pub mod config;
pub mod error;
pub mod eval;
pub mod report;

pub use config::Config;
pub use error::{DrugrecallError, Result};
pub use eval::{normalize_doid, run_evaluation, EvaluationRow};
pub use report::{run_report, RunSpec, SummaryRow};
