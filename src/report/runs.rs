//! Named evaluation runs and their loading.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use crate::error::{DrugrecallError, Result};
use crate::eval::{read_results, EvaluationRow};

/// File-name prefix of results tables written by the evaluator.
pub const RESULTS_FILE_PREFIX: &str = "evaluation_metrics_";

/// Where to find one run's results table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunSpec {
    pub name: String,
    pub path: PathBuf,
}

impl RunSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Parses `NAME=PATH`, the form used on the command line.
impl FromStr for RunSpec {
    type Err = DrugrecallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self::new(name.trim(), path.trim()))
            }
            _ => Err(DrugrecallError::InvalidInput(format!(
                "run must be NAME=PATH, got '{}'",
                s
            ))),
        }
    }
}

/// One evaluation run loaded into memory
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub name: String,
    pub rows: Vec<EvaluationRow>,
}

impl Run {
    pub fn new(name: impl Into<String>, rows: Vec<EvaluationRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// DOID to row; later rows win on duplicate DOIDs.
    pub fn by_doid(&self) -> HashMap<&str, &EvaluationRow> {
        self.rows.iter().map(|r| (r.doid.as_str(), r)).collect()
    }

    pub fn recalls(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.recall).collect()
    }
}

/// Load every run in the given order.
pub fn load_runs(specs: &[RunSpec]) -> Result<Vec<Run>> {
    specs
        .iter()
        .map(|spec| -> Result<Run> {
            log::info!("Loading run '{}' from {}", spec.name, spec.path.display());
            Ok(Run::new(spec.name.clone(), read_results(&spec.path)?))
        })
        .collect()
}

/// Find `evaluation_metrics_<name>.csv` tables directly inside `dir`.
///
/// Runs are named after the file-name suffix and sorted by file name.
pub fn discover_runs(dir: &Path) -> Result<Vec<RunSpec>> {
    if !dir.is_dir() {
        return Err(DrugrecallError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("results directory not found: {}", dir.display()),
        )));
    }

    let mut specs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let name = match file_name
            .strip_prefix(RESULTS_FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(".csv"))
        {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        specs.push(RunSpec::new(name, entry.path()));
    }

    log::info!("Discovered {} runs in {}", specs.len(), dir.display());
    Ok(specs)
}

/// DOIDs present in every run, ascending. Empty when there are no runs.
pub fn common_doids(runs: &[Run]) -> Vec<String> {
    let mut iter = runs.iter();
    let first = match iter.next() {
        Some(run) => run,
        None => return Vec::new(),
    };

    let mut common: BTreeSet<&str> = first.rows.iter().map(|r| r.doid.as_str()).collect();
    for run in iter {
        let doids: BTreeSet<&str> = run.rows.iter().map(|r| r.doid.as_str()).collect();
        common.retain(|d| doids.contains(d));
    }
    common.into_iter().map(String::from).collect()
}
