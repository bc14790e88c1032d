//! In-memory table shared by every cleaning stage.
//!
//! [`Dataset`] wraps a polars `DataFrame` and adds a declared [`ColumnKind`]
//! per column. Stages look columns up by name, select them by kind in schema
//! order, replace whole columns, and drop rows through a mask so that every
//! column stays aligned.

use crate::config::PipelineConfig;
use crate::error::{CleaningError, Result};
use crate::utils::{DtypeCategory, get_dtype_category};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free-form or categorical strings
    Categorical,
    /// Integer or floating point measurements
    Numeric,
    /// Two-state column stored as 0/1
    Flag,
    /// Required key carried through untouched
    Identifier,
    /// Anything else (dates, nested types); carried through untouched
    Other,
}

impl ColumnKind {
    /// Kind implied by a polars dtype when nothing is configured.
    pub fn infer(dtype: &DataType) -> Self {
        match get_dtype_category(dtype) {
            DtypeCategory::Numeric => Self::Numeric,
            DtypeCategory::String => Self::Categorical,
            DtypeCategory::Boolean => Self::Flag,
            DtypeCategory::Datetime | DtypeCategory::Other => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categorical => "categorical",
            Self::Numeric => "numeric",
            Self::Flag => "flag",
            Self::Identifier => "identifier",
            Self::Other => "other",
        }
    }
}

/// A table of named, typed, equally long columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    kinds: HashMap<String, ColumnKind>,
}

impl Dataset {
    /// Wrap a frame, inferring every column's kind from its dtype.
    pub fn from_frame(frame: DataFrame) -> Self {
        let kinds = frame
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), ColumnKind::infer(col.dtype())))
            .collect();
        Self { frame, kinds }
    }

    /// Wrap a frame and apply the configured roles: flag columns and
    /// identifier columns that exist in the frame get their declared kind.
    /// Missing configured columns are left for the stages to report.
    pub fn with_roles(frame: DataFrame, config: &PipelineConfig) -> Self {
        let mut dataset = Self::from_frame(frame);
        for name in &config.binary_columns {
            if let Some(kind) = dataset.kinds.get_mut(name) {
                *kind = ColumnKind::Flag;
            }
        }
        for name in &config.id_columns {
            if let Some(kind) = dataset.kinds.get_mut(name) {
                *kind = ColumnKind::Identifier;
            }
        }
        dataset
    }

    /// Override the declared kind of an existing column.
    pub fn set_kind(&mut self, name: &str, kind: ColumnKind) -> Result<()> {
        match self.kinds.get_mut(name) {
            Some(existing) => {
                *existing = kind;
                Ok(())
            }
            None => Err(CleaningError::ColumnNotFound(name.to_string())),
        }
    }

    /// Declared kind of a column.
    pub fn kind(&self, name: &str) -> Result<ColumnKind> {
        self.kinds
            .get(name)
            .copied()
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Names of the columns declared with `kind`, in schema order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kinds.get(name) == Some(&kind))
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// Values of a column as `f64`. Nulls, `NaN` and values that do not cast
    /// become `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.column(name)?;
        let float_series = series.cast(&DataType::Float64)?;
        let values = float_series
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    /// Values of a column rendered as strings. Nulls become `None`.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.column(name)?;
        let str_series = series.cast(&DataType::String)?;
        let values = str_series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Per-row missing indicator. For float columns `NaN` counts as missing.
    pub fn missing_mask(&self, name: &str) -> Result<Vec<bool>> {
        let series = self.column(name)?;
        if series.dtype().is_float() {
            Ok(self
                .numeric_values(name)?
                .iter()
                .map(Option::is_none)
                .collect())
        } else {
            Ok(series
                .is_null()
                .into_iter()
                .map(|v| v.unwrap_or(false))
                .collect())
        }
    }

    /// Number of missing entries in a column.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.missing_mask(name)?.into_iter().filter(|m| *m).count())
    }

    /// Total number of missing cells in the table.
    pub fn total_missing(&self) -> Result<usize> {
        self.column_names()
            .iter()
            .map(|name| self.missing_count(name))
            .sum()
    }

    /// Replace a column in place. The replacement takes the column's name and
    /// must have exactly one entry per row.
    pub fn replace_column(&mut self, name: &str, mut series: Series) -> Result<()> {
        if !self.has_column(name) {
            return Err(CleaningError::ColumnNotFound(name.to_string()));
        }
        if series.len() != self.height() {
            return Err(CleaningError::LengthMismatch {
                column: name.to_string(),
                expected: self.height(),
                actual: series.len(),
            });
        }
        series.rename(name.into());
        self.frame.replace(name, series)?;
        Ok(())
    }

    /// Keep only the rows whose mask entry is `true`, across every column.
    /// Returns the number of rows dropped.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        if keep.len() != self.height() {
            return Err(CleaningError::LengthMismatch {
                column: "<row mask>".to_string(),
                expected: self.height(),
                actual: keep.len(),
            });
        }
        let before = self.height();
        let mask = BooleanChunked::from_slice("mask".into(), keep);
        self.frame = self.frame.filter(&mask)?;
        Ok(before - self.height())
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let df = df![
            "CustomerID" => [1i64, 2, 3, 4],
            "Gender" => [Some("Male"), None, Some("Female"), Some("Female")],
            "Age" => [Some(30.0), Some(f64::NAN), None, Some(50.0)],
            "Churn" => [0i64, 1, 0, 1],
        ]
        .unwrap();
        Dataset::with_roles(df, &PipelineConfig::default())
    }

    #[test]
    fn test_kinds_from_roles() {
        let ds = sample();
        assert_eq!(ds.kind("CustomerID").unwrap(), ColumnKind::Identifier);
        assert_eq!(ds.kind("Gender").unwrap(), ColumnKind::Categorical);
        assert_eq!(ds.kind("Age").unwrap(), ColumnKind::Numeric);
        assert_eq!(ds.kind("Churn").unwrap(), ColumnKind::Flag);
        assert!(matches!(
            ds.kind("Balance"),
            Err(CleaningError::ColumnNotFound(name)) if name == "Balance"
        ));
    }

    #[test]
    fn test_columns_of_kind_keeps_schema_order() {
        let df = df![
            "b" => [1.0, 2.0],
            "name" => ["x", "y"],
            "a" => [3i64, 4],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df);
        assert_eq!(ds.columns_of_kind(ColumnKind::Numeric), vec!["b", "a"]);
        assert_eq!(ds.columns_of_kind(ColumnKind::Categorical), vec!["name"]);
    }

    #[test]
    fn test_missing_counts_include_nan() {
        let ds = sample();
        assert_eq!(ds.missing_count("Age").unwrap(), 2);
        assert_eq!(ds.missing_count("Gender").unwrap(), 1);
        assert_eq!(ds.total_missing().unwrap(), 3);
        assert_eq!(
            ds.numeric_values("Age").unwrap(),
            vec![Some(30.0), None, None, Some(50.0)]
        );
    }

    #[test]
    fn test_missing_mask() {
        let ds = sample();
        assert_eq!(ds.missing_mask("Age").unwrap(), vec![false, true, true, false]);
        assert_eq!(ds.missing_mask("Gender").unwrap(), vec![false, true, false, false]);
        assert_eq!(ds.missing_mask("CustomerID").unwrap(), vec![false; 4]);
    }

    #[test]
    fn test_column_not_found() {
        let ds = sample();
        assert!(matches!(
            ds.column("Balance"),
            Err(CleaningError::ColumnNotFound(_))
        ));
        assert!(ds.numeric_values("Balance").is_err());
    }

    #[test]
    fn test_replace_column_checks_length() {
        let mut ds = sample();
        let short = Series::new("Age".into(), vec![1.0, 2.0]);
        assert!(matches!(
            ds.replace_column("Age", short),
            Err(CleaningError::LengthMismatch { expected: 4, actual: 2, .. })
        ));

        let renamed = Series::new("whatever".into(), vec![1.0, 2.0, 3.0, 4.0]);
        ds.replace_column("Age", renamed).unwrap();
        assert_eq!(
            ds.numeric_values("Age").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(ds.column_names(), vec!["CustomerID", "Gender", "Age", "Churn"]);
    }

    #[test]
    fn test_retain_rows_keeps_alignment() {
        let mut ds = sample();
        let dropped = ds.retain_rows(&[true, false, true, false]).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(ds.height(), 2);
        assert_eq!(
            ds.numeric_values("CustomerID").unwrap(),
            vec![Some(1.0), Some(3.0)]
        );
        assert_eq!(
            ds.string_values("Gender").unwrap(),
            vec![Some("Male".to_string()), Some("Female".to_string())]
        );
        assert_eq!(ds.numeric_values("Age").unwrap(), vec![Some(30.0), None]);
    }

    #[test]
    fn test_retain_rows_rejects_wrong_mask() {
        let mut ds = sample();
        assert!(ds.retain_rows(&[true]).is_err());
        assert_eq!(ds.height(), 4);
    }
}
