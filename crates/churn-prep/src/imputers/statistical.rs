//! Mode / mean imputation and required-key row filtering.

use crate::config::{EmptyColumnPolicy, PipelineConfig};
use crate::dataset::{ColumnKind, Dataset};
use crate::error::{CleaningError, Result};
use crate::profiler::statistics::{mean, mode, present};
use crate::types::{ActionType, CleaningAction};
use crate::utils::{fill_numeric_nulls, fill_string_nulls};
use polars::prelude::*;
use tracing::{debug, info};

/// Fill used for all-missing categorical columns under `FillDefault`.
pub const DEFAULT_CATEGORY: &str = "unknown";

/// Fills gaps in categorical and numeric columns, then drops rows that lack
/// a required key.
///
/// Flag columns are left alone; [`crate::BinaryNormalizer`] fills those.
#[derive(Debug, Clone)]
pub struct MissingValueImputer {
    categorical_column: Option<String>,
    required_keys: Vec<String>,
    empty_column_policy: EmptyColumnPolicy,
}

impl MissingValueImputer {
    pub fn new(
        categorical_column: Option<String>,
        required_keys: Vec<String>,
        empty_column_policy: EmptyColumnPolicy,
    ) -> Self {
        Self {
            categorical_column,
            required_keys,
            empty_column_policy,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.categorical_column.clone(),
            config.required_key_columns(),
            config.empty_column_policy,
        )
    }

    /// Run the imputation pass. Returns the number of rows dropped for
    /// missing required keys.
    pub fn impute(&self, ds: &mut Dataset, actions: &mut Vec<CleaningAction>) -> Result<usize> {
        for key in &self.required_keys {
            if !ds.has_column(key) {
                return Err(CleaningError::ColumnNotFound(key.clone()));
            }
        }

        if let Some(col) = &self.categorical_column
            && ds.has_column(col)
        {
            self.fill_categorical(ds, col, actions)?;
            Self::lowercase(ds, col, actions)?;
        }

        for col in ds.columns_of_kind(ColumnKind::Categorical) {
            if self.categorical_column.as_deref() != Some(col.as_str()) {
                self.fill_categorical(ds, &col, actions)?;
            }
        }

        for col in ds.columns_of_kind(ColumnKind::Numeric) {
            self.fill_numeric(ds, &col, actions)?;
        }

        let dropped = self.drop_missing_keys(ds, actions)?;

        info!("Missing data handled");
        Ok(dropped)
    }

    /// Fill missing entries of a string column with its mode.
    fn fill_categorical(
        &self,
        ds: &mut Dataset,
        col: &str,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<()> {
        let values = ds.string_values(col)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(());
        }

        let fill = match mode(values.iter().flatten()) {
            Some(m) => m.clone(),
            None => match self.empty_column_policy {
                EmptyColumnPolicy::Fail => return Err(CleaningError::NoValidValues(col.to_string())),
                EmptyColumnPolicy::FillDefault => DEFAULT_CATEGORY.to_string(),
            },
        };

        ds.replace_column(col, fill_string_nulls(col, &values, &fill))?;
        debug!("Filled {} missing values in '{}' with mode '{}'", missing, col, fill);
        actions.push(
            CleaningAction::new(
                ActionType::ValueImputed,
                col,
                missing,
                format!("Filled {} missing values in '{}' with mode", missing, col),
            )
            .with_details(format!("mode: '{}'", fill)),
        );
        Ok(())
    }

    /// Lowercase every value of a string column.
    fn lowercase(ds: &mut Dataset, col: &str, actions: &mut Vec<CleaningAction>) -> Result<()> {
        let values = ds.string_values(col)?;
        let mut changed = 0;
        let lowered: Vec<Option<String>> = values
            .into_iter()
            .map(|v| {
                v.map(|s| {
                    let lower = s.to_lowercase();
                    if lower != s {
                        changed += 1;
                    }
                    lower
                })
            })
            .collect();

        ds.replace_column(col, Series::new(col.into(), lowered))?;
        debug!("Lowercased '{}' ({} values changed)", col, changed);
        actions.push(CleaningAction::new(
            ActionType::CaseNormalized,
            col,
            changed,
            format!("Converted '{}' to lowercase", col),
        ));
        Ok(())
    }

    /// Fill missing entries of a numeric column with the mean of the present
    /// entries. Columns without gaps are not touched.
    fn fill_numeric(
        &self,
        ds: &mut Dataset,
        col: &str,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<()> {
        let values = ds.numeric_values(col)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(());
        }

        let fill = match mean(&present(&values)) {
            Some(m) => m,
            None => match self.empty_column_policy {
                EmptyColumnPolicy::Fail => return Err(CleaningError::NoValidValues(col.to_string())),
                EmptyColumnPolicy::FillDefault => 0.0,
            },
        };

        ds.replace_column(col, fill_numeric_nulls(col, &values, fill))?;
        debug!("Filled {} missing values in '{}' with mean {}", missing, col, fill);
        actions.push(
            CleaningAction::new(
                ActionType::ValueImputed,
                col,
                missing,
                format!("Filled {} missing values in '{}' with mean", missing, col),
            )
            .with_details(format!("mean: {}", fill)),
        );
        Ok(())
    }

    /// Drop rows missing any required key.
    fn drop_missing_keys(&self, ds: &mut Dataset, actions: &mut Vec<CleaningAction>) -> Result<usize> {
        if self.required_keys.is_empty() {
            return Ok(0);
        }

        let mut keep = vec![true; ds.height()];
        for key in &self.required_keys {
            for (row, missing) in ds.missing_mask(key)?.into_iter().enumerate() {
                if missing {
                    keep[row] = false;
                }
            }
        }

        let dropped = ds.retain_rows(&keep)?;
        if dropped > 0 {
            debug!("Dropped {} rows missing {:?}", dropped, self.required_keys);
            actions.push(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                dropped,
                format!(
                    "Dropped {} rows missing required keys {:?}",
                    dropped, self.required_keys
                ),
            ));
        }
        Ok(dropped)
    }
}
