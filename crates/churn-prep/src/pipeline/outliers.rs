//! Outlier handling module.
//!
//! Applies the IQR rule to every numeric column, either replacing outliers
//! with the column median or removing the rows that hold them.

use crate::config::{OutlierStrategy, PipelineConfig};
use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::pipeline::progress::ColumnCallback;
use crate::profiler::statistics::{IqrBounds, NumericSummary, present};
use crate::types::{ActionType, CleaningAction};
use polars::prelude::*;
use tracing::{debug, info};

/// Handles outlier detection and treatment.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    strategy: OutlierStrategy,
    multiplier: f64,
}

impl OutlierFilter {
    pub fn new(strategy: OutlierStrategy, multiplier: f64) -> Self {
        Self {
            strategy,
            multiplier,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.outlier_strategy, config.iqr_multiplier)
    }

    /// Handle outliers in every numeric column, in schema order. Returns the
    /// number of values replaced or rows removed.
    pub fn apply(&self, ds: &mut Dataset, actions: &mut Vec<CleaningAction>) -> Result<usize> {
        self.apply_with_progress(ds, actions, &mut |_, _, _| {})
    }

    /// Same as [`apply`](Self::apply), calling `on_column(name, index, total)`
    /// before each column is visited.
    pub fn apply_with_progress(
        &self,
        ds: &mut Dataset,
        actions: &mut Vec<CleaningAction>,
        on_column: ColumnCallback<'_>,
    ) -> Result<usize> {
        let columns = ds.columns_of_kind(ColumnKind::Numeric);
        let handled = match self.strategy {
            OutlierStrategy::Median => self.replace_with_median(ds, &columns, actions, on_column)?,
            OutlierStrategy::Remove => self.remove_rows(ds, &columns, actions, on_column)?,
        };
        info!("Outliers handled");
        Ok(handled)
    }

    fn bounds(&self, summary: &NumericSummary) -> IqrBounds {
        IqrBounds::from_summary(summary, self.multiplier)
    }

    /// Replace values outside the IQR bounds with the column median.
    fn replace_with_median(
        &self,
        ds: &mut Dataset,
        columns: &[String],
        actions: &mut Vec<CleaningAction>,
        on_column: ColumnCallback<'_>,
    ) -> Result<usize> {
        let mut total = 0;

        for (index, col) in columns.iter().enumerate() {
            on_column(col.as_str(), index, columns.len());
            let values = ds.numeric_values(col)?;
            let Some(summary) = NumericSummary::from_values(&present(&values)) else {
                debug!("Skipping '{}': no values", col);
                continue;
            };
            let bounds = self.bounds(&summary);

            let mut replaced = 0;
            let updated: Vec<Option<f64>> = values
                .iter()
                .map(|v| match v {
                    Some(x) if !bounds.contains(*x) => {
                        replaced += 1;
                        Some(summary.median)
                    }
                    other => *other,
                })
                .collect();

            if replaced == 0 {
                continue;
            }

            ds.replace_column(col, Series::new(col.into(), updated))?;
            total += replaced;
            debug!(
                "Replaced {} outliers in '{}' outside [{}, {}] with median {}",
                replaced, col, bounds.lower, bounds.upper, summary.median
            );
            actions.push(
                CleaningAction::new(
                    ActionType::OutlierHandled,
                    col,
                    replaced,
                    format!("Replaced {} outliers in '{}' with median", replaced, col),
                )
                .with_details(format!(
                    "bounds [{}, {}], median {}",
                    bounds.lower, bounds.upper, summary.median
                )),
            );
        }

        Ok(total)
    }

    /// Remove rows containing outliers, narrowing the table one column at a
    /// time. Missing values are kept.
    fn remove_rows(
        &self,
        ds: &mut Dataset,
        columns: &[String],
        actions: &mut Vec<CleaningAction>,
        on_column: ColumnCallback<'_>,
    ) -> Result<usize> {
        let original_rows = ds.height();

        for (index, col) in columns.iter().enumerate() {
            if ds.is_empty() {
                debug!("Table is empty; skipping remaining outlier columns");
                break;
            }
            on_column(col.as_str(), index, columns.len());

            let values = ds.numeric_values(col)?;
            let Some(summary) = NumericSummary::from_values(&present(&values)) else {
                debug!("Skipping '{}': no values", col);
                continue;
            };
            let bounds = self.bounds(&summary);

            let keep: Vec<bool> = values
                .iter()
                .map(|v| v.is_none_or(|x| bounds.contains(x)))
                .collect();
            let removed = ds.retain_rows(&keep)?;

            if removed > 0 {
                debug!(
                    "Removed {} rows with '{}' outside [{}, {}]",
                    removed, col, bounds.lower, bounds.upper
                );
                actions.push(
                    CleaningAction::new(
                        ActionType::OutlierHandled,
                        col,
                        removed,
                        format!("Removed {} rows with outliers in '{}'", removed, col),
                    )
                    .with_details(format!("bounds [{}, {}]", bounds.lower, bounds.upper)),
                );
            }
        }

        let rows_removed = original_rows - ds.height();
        if rows_removed > 0 {
            actions.push(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                rows_removed,
                format!("Removed {} rows containing outliers", rows_removed),
            ));
        }
        Ok(rows_removed)
    }
}
