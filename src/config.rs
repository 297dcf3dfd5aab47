use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::DrugrecallError;
use crate::report::RunSpec;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DRUGRECALL_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "drugrecall.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub drugrecall: DrugrecallConfig,
    #[serde(default)]
    pub evaluate: EvaluateConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// File the values came from; `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct DrugrecallConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DrugrecallConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Inputs and output of the recall evaluator
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateConfig {
    #[serde(default = "default_predictions")]
    pub predictions: PathBuf,
    #[serde(default = "default_ground_truth")]
    pub ground_truth: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            predictions: default_predictions(),
            ground_truth: default_ground_truth(),
            output: default_output(),
        }
    }
}

/// Runs compared by the summary reporter
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_runs")]
    pub runs: Vec<RunSpec>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            runs: default_runs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_predictions() -> PathBuf {
    PathBuf::from("predictions_csv/final_drug_predictions_grouped_all_top30.csv")
}

fn default_ground_truth() -> PathBuf {
    PathBuf::from("data/testing_data.csv")
}

fn default_output() -> PathBuf {
    default_results_dir().join("evaluation_metrics_top30.csv")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("eval_results")
}

fn default_runs() -> Vec<RunSpec> {
    let dir = default_results_dir();
    vec![
        RunSpec::new("All drugs", dir.join("evaluation_metrics_all.csv")),
        RunSpec::new("Top 30", dir.join("evaluation_metrics_top30.csv")),
        RunSpec::new("Common drugs", dir.join("evaluation_metrics_common.csv")),
    ]
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in DRUGRECALL_CONFIG environment variable
    /// 2. ./drugrecall.toml in current directory
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let path = match std::env::var(CONFIG_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|local| local.exists()),
        };

        let config = match path {
            Some(path) => Self {
                source: Some(path.clone()),
                ..Self::from_file(&path)?
            },
            None => Self::default(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Log where the values came from. Logging is set up from the loaded
    /// level, so this runs after `load`.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => log::info!("Loaded config from {}", path.display()),
            None => log::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE),
        }
    }

    /// Parse a config file without validating it
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.evaluate.output.file_name().is_none() {
            return Err(DrugrecallError::Config(format!(
                "evaluate.output must name a file: {}",
                self.evaluate.output.display()
            )));
        }

        if self.report.runs.is_empty() {
            return Err(DrugrecallError::Config(
                "report.runs must list at least one run".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for run in &self.report.runs {
            if run.name.trim().is_empty() {
                return Err(DrugrecallError::Config(format!(
                    "report.runs entry for {} has an empty name",
                    run.path.display()
                )));
            }
            if !seen.insert(run.name.as_str()) {
                return Err(DrugrecallError::Config(format!(
                    "report.runs has duplicate run name '{}'",
                    run.name
                )));
            }
        }

        Ok(())
    }
}
