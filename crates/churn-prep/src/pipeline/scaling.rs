//! Min-max scaling of numeric columns.

use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::pipeline::progress::ColumnCallback;
use crate::profiler::statistics::{NumericSummary, present};
use crate::types::{ActionType, CleaningAction};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What the scaler did with the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingOutcome {
    /// Numeric columns were rescaled into [0, 1].
    Scaled { columns: usize, degenerate: usize },
    /// The table had no rows; nothing was touched.
    SkippedEmpty,
}

/// Rescales every numeric column to `(v - min) / (max - min)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureScaler;

impl FeatureScaler {
    pub fn new() -> Self {
        Self
    }

    pub fn scale(&self, ds: &mut Dataset, actions: &mut Vec<CleaningAction>) -> Result<ScalingOutcome> {
        self.scale_with_progress(ds, actions, &mut |_, _, _| {})
    }

    /// Same as [`scale`](Self::scale), calling `on_column(name, index, total)`
    /// before each column is scaled.
    pub fn scale_with_progress(
        &self,
        ds: &mut Dataset,
        actions: &mut Vec<CleaningAction>,
        on_column: ColumnCallback<'_>,
    ) -> Result<ScalingOutcome> {
        if ds.is_empty() {
            warn!("Dataset is empty after cleaning; scaling skipped");
            return Ok(ScalingOutcome::SkippedEmpty);
        }

        let mut scaled = 0;
        let mut degenerate = 0;

        let columns = ds.columns_of_kind(ColumnKind::Numeric);
        for (index, col) in columns.iter().enumerate() {
            on_column(col.as_str(), index, columns.len());
            let values = ds.numeric_values(col)?;
            let Some(summary) = NumericSummary::from_values(&present(&values)) else {
                debug!("Skipping '{}': no values", col);
                continue;
            };

            let degenerate_column = summary.max == summary.min;
            let updated: Vec<Option<f64>> = if degenerate_column {
                values.iter().map(|v| v.map(|_| 0.0)).collect()
            } else {
                values
                    .iter()
                    .map(|v| v.map(|x| min_max(x, summary.min, summary.max)))
                    .collect()
            };
            ds.replace_column(col, Series::new(col.as_str().into(), updated))?;

            if degenerate_column {
                degenerate += 1;
                debug!("'{}' has zero variance; mapped to 0.0", col);
                actions.push(CleaningAction::new(
                    ActionType::DegenerateColumn,
                    col,
                    summary.count,
                    format!("'{}' is constant ({}); all values set to 0", col, summary.min),
                ));
            } else {
                scaled += 1;
                debug!("Scaled '{}' from [{}, {}]", col, summary.min, summary.max);
                actions.push(
                    CleaningAction::new(
                        ActionType::DataScaled,
                        col,
                        summary.count,
                        format!("Min-max scaled '{}'", col),
                    )
                    .with_details(format!("min {}, max {}", summary.min, summary.max)),
                );
            }
        }

        info!("Scaled {} columns ({} constant)", scaled, degenerate);
        Ok(ScalingOutcome::Scaled {
            columns: scaled + degenerate,
            degenerate,
        })
    }
}

/// `(x - min) / (max - min)`. When the range overflows `f64` the operands
/// are halved first.
fn min_max(x: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.is_finite() {
        (x - min) / range
    } else {
        (x / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_scales_into_unit_range() {
        let df = df![
            "CustomerID" => [7i64, 8, 9],
            "Age" => [Some(20.0), None, Some(60.0)],
            "Tenure" => [1i64, 3, 5],
            "Churn" => [0i64, 1, 1],
        ]
        .unwrap();
        let mut ds = Dataset::with_roles(df, &PipelineConfig::default());
        let outcome = FeatureScaler::new().scale(&mut ds, &mut vec![]).unwrap();

        assert_eq!(outcome, ScalingOutcome::Scaled { columns: 2, degenerate: 0 });
        assert_eq!(ds.numeric_values("Age").unwrap(), vec![Some(0.0), None, Some(1.0)]);
        assert_eq!(
            ds.numeric_values("Tenure").unwrap(),
            vec![Some(0.0), Some(0.5), Some(1.0)]
        );
        // Identifier and flag columns are untouched.
        assert_eq!(ds.column("CustomerID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(ds.column("Churn").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_degenerate_column() {
        let df = df!["Balance" => [5.0, 5.0, 5.0]].unwrap();
        let mut ds = Dataset::from_frame(df);
        let mut actions = vec![];
        let outcome = FeatureScaler::new().scale(&mut ds, &mut actions).unwrap();

        assert_eq!(outcome, ScalingOutcome::Scaled { columns: 1, degenerate: 1 });
        assert_eq!(
            ds.numeric_values("Balance").unwrap(),
            vec![Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(actions[0].action_type, ActionType::DegenerateColumn);
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let df = df!["Balance" => [-1e308, 0.0, 1e308, 5.0]].unwrap();
        let mut ds = Dataset::from_frame(df);
        FeatureScaler::new().scale(&mut ds, &mut vec![]).unwrap();

        let values = ds.numeric_values("Balance").unwrap();
        assert_eq!(values[0], Some(0.0));
        assert_eq!(values[1], Some(0.5));
        assert_eq!(values[2], Some(1.0));
        assert!(values.iter().all(|v| matches!(v, Some(x) if (0.0..=1.0).contains(x))));
    }

    #[test]
    fn test_reports_each_column() {
        let df = df![
            "Age" => [20.0, 40.0],
            "Balance" => [1.0, 2.0],
            "Churn" => [0i64, 1],
        ]
        .unwrap();
        let mut ds = Dataset::with_roles(df, &PipelineConfig::default());
        let mut visited = Vec::new();
        FeatureScaler::new()
            .scale_with_progress(&mut ds, &mut vec![], &mut |col, index, total| {
                visited.push((col.to_string(), index, total));
            })
            .unwrap();

        assert_eq!(
            visited,
            vec![("Age".to_string(), 0, 2), ("Balance".to_string(), 1, 2)]
        );
    }

    #[test]
    fn test_empty_table_skipped() {
        let df = df!["Balance" => Vec::<f64>::new()].unwrap();
        let mut ds = Dataset::from_frame(df);
        let mut actions = vec![];
        let outcome = FeatureScaler::new().scale(&mut ds, &mut actions).unwrap();
        assert_eq!(outcome, ScalingOutcome::SkippedEmpty);
        assert!(actions.is_empty());
    }
}
