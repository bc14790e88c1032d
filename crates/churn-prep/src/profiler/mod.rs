//! Data profiling module.
//!
//! Per-column descriptions of a [`Dataset`] used by the cleaning report, plus
//! the pure statistics shared by the cleaning stages.

pub mod statistics;

use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::utils::is_numeric_dtype;
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use statistics::{NumericSummary, present};

/// Description of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_count: usize,
    /// Present for numeric, flag and identifier columns with at least one value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Description of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub total_missing: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Data profiler for analyzing dataset structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of the dataset, in schema order.
    pub fn profile_dataset(ds: &Dataset) -> Result<DatasetProfile> {
        let columns = ds
            .column_names()
            .iter()
            .map(|name| Self::profile_column(ds, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(DatasetProfile {
            shape: (ds.height(), ds.width()),
            total_missing: columns.iter().map(|c| c.missing_count).sum(),
            columns,
        })
    }

    pub fn profile_column(ds: &Dataset, name: &str) -> Result<ColumnProfile> {
        let series = ds.column(name)?;
        let kind = ds.kind(name)?;
        let missing_count = ds.missing_count(name)?;
        let missing_percentage = if ds.height() > 0 {
            (missing_count as f64 / ds.height() as f64) * 100.0
        } else {
            0.0
        };

        let numeric = match kind {
            ColumnKind::Numeric | ColumnKind::Flag | ColumnKind::Identifier
                if is_numeric_dtype(series.dtype()) || series.dtype() == &DataType::Boolean =>
            {
                NumericSummary::from_values(&present(&ds.numeric_values(name)?))
            }
            _ => None,
        };

        Ok(ColumnProfile {
            name: name.to_string(),
            kind,
            dtype: series.dtype().to_string(),
            missing_count,
            missing_percentage,
            unique_count: series.n_unique()?,
            numeric,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use polars::prelude::*;

    #[test]
    fn test_profile_dataset() {
        let df = df![
            "CustomerID" => [1i64, 2, 3, 4],
            "Gender" => [Some("Male"), None, Some("Female"), Some("Male")],
            "Age" => [Some(20.0), None, Some(40.0), Some(30.0)],
        ]
        .unwrap();
        let ds = Dataset::with_roles(df, &PipelineConfig::default());
        let profile = DataProfiler::profile_dataset(&ds).unwrap();

        assert_eq!(profile.shape, (4, 3));
        assert_eq!(profile.total_missing, 2);

        let gender = &profile.columns[1];
        assert_eq!(gender.kind, ColumnKind::Categorical);
        assert_eq!(gender.missing_count, 1);
        assert_eq!(gender.missing_percentage, 25.0);
        assert!(gender.numeric.is_none());

        let age = profile.columns[2].numeric.unwrap();
        assert_eq!(age.count, 3);
        assert_eq!(age.mean, 30.0);
        assert_eq!(age.min, 20.0);
        assert_eq!(age.max, 40.0);

        assert_eq!(profile.columns[0].kind, ColumnKind::Identifier);
    }

    #[test]
    fn test_profile_empty_dataset() {
        let df = df!["Age" => Vec::<f64>::new()].unwrap();
        let profile = DataProfiler::profile_dataset(&Dataset::from_frame(df)).unwrap();
        assert_eq!(profile.columns[0].missing_percentage, 0.0);
        assert!(profile.columns[0].numeric.is_none());
    }
}
