use crate::config::PipelineConfig;
use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::profiler::statistics::pearson;
use crate::profiler::{DataProfiler, DatasetProfile};
use crate::types::CleaningSummary;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything known about one cleaning run.
///
/// Used for JSON output to stdout (`--json`), the report file
/// (`--emit-report`), and library callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,

    pub config: PipelineConfig,
    pub summary: CleaningSummary,

    /// Column profiles of the input table
    pub before: DatasetProfile,
    /// Column profiles of the cleaned table
    pub after: DatasetProfile,

    /// Value counts of each flag column in the cleaned table
    pub flag_distributions: BTreeMap<String, FlagDistribution>,

    /// Pairwise correlation of the cleaned numeric and flag columns
    pub correlation: CorrelationMatrix,
}

/// Counts of 0 and 1 in a flag column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDistribution {
    pub zeros: usize,
    pub ones: usize,
}

impl FlagDistribution {
    /// Share of ones, `None` for an empty column.
    pub fn positive_rate(&self) -> Option<f64> {
        let total = self.zeros + self.ones;
        (total > 0).then(|| self.ones as f64 / total as f64)
    }
}

/// Square matrix of Pearson coefficients. `None` where undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn compute(ds: &Dataset, columns: &[String]) -> Result<Self> {
        let data = columns
            .iter()
            .map(|c| ds.numeric_values(c))
            .collect::<Result<Vec<_>>>()?;

        let values = data
            .iter()
            .map(|xs| data.iter().map(|ys| pearson(xs, ys)).collect())
            .collect();

        Ok(Self {
            columns: columns.to_vec(),
            values,
        })
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

impl CleaningReport {
    /// Build a report from the input table, the cleaned table and the run
    /// summary.
    pub fn build(
        original: &Dataset,
        cleaned: &Dataset,
        summary: &CleaningSummary,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let mut flag_distributions = BTreeMap::new();
        for col in cleaned.columns_of_kind(ColumnKind::Flag) {
            let mut dist = FlagDistribution::default();
            for value in cleaned.numeric_values(&col)?.into_iter().flatten() {
                if value > 0.0 {
                    dist.ones += 1;
                } else {
                    dist.zeros += 1;
                }
            }
            flag_distributions.insert(col, dist);
        }

        let correlated: Vec<String> = cleaned
            .column_names()
            .into_iter()
            .filter(|c| {
                matches!(
                    cleaned.kind(c),
                    Ok(ColumnKind::Numeric) | Ok(ColumnKind::Flag)
                )
            })
            .collect();

        Ok(Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: None,
            output_file: None,
            config: config.clone(),
            summary: summary.clone(),
            before: DataProfiler::profile_dataset(original)?,
            after: DataProfiler::profile_dataset(cleaned)?,
            flag_distributions,
            correlation: CorrelationMatrix::compute(cleaned, &correlated)?,
        })
    }

    pub fn with_files(mut self, input: Option<&Path>, output: Option<&Path>) -> Self {
        self.input_file = input.map(|p| p.display().to_string());
        self.output_file = output.map(|p| p.display().to_string());
        self
    }
}

// ============================================================================
// Report Writing
// ============================================================================

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the report as pretty JSON to `<stem>_report.json`.
    pub fn write_report_to_file(&self, report: &CleaningReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let report_path = self.output_dir.join(format!("{}_report.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;
        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
