//! Model-ready export of a cleaned dataset.
//!
//! The designated categorical column is one-hot encoded with the first
//! category dropped, identifier columns are removed, and the target is split
//! off as the label.

use crate::config::PipelineConfig;
use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Features and label ready for model training.
#[derive(Debug, Clone)]
pub struct TrainingFrame {
    pub features: DataFrame,
    pub label: Series,
}

impl TrainingFrame {
    pub fn from_dataset(ds: &Dataset, config: &PipelineConfig) -> Result<Self> {
        let target = config.target_column.as_str();
        let label = ds.column(target)?.clone();

        let encoded = match &config.categorical_column {
            Some(col) if ds.has_column(col) => Some(col.as_str()),
            _ => None,
        };

        let mut columns: Vec<Column> = Vec::new();
        for name in ds.column_names() {
            if name == target
                || ds.kind(&name)? == ColumnKind::Identifier
                || encoded == Some(name.as_str())
            {
                continue;
            }
            columns.push(ds.column(&name)?.clone().into_column());
        }

        if let Some(col) = encoded {
            let indicators = one_hot_drop_first(ds, col)?;
            debug!("Encoded '{}' into {} indicator columns", col, indicators.len());
            columns.extend(indicators.into_iter().map(Series::into_column));
        }

        let features = DataFrame::new(columns)?;
        info!(
            "Training frame: {} rows, {} features, label '{}'",
            features.height(),
            features.width(),
            target
        );
        Ok(Self { features, label })
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Features followed by the label, as one frame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut df = self.features.clone();
        df.with_column(self.label.clone())?;
        Ok(df)
    }
}

/// Int32 indicator columns for every category except the first in sorted
/// order. Missing values get 0 in every indicator. A column without any
/// category (e.g. an emptied table) yields no indicators.
fn one_hot_drop_first(ds: &Dataset, col: &str) -> Result<Vec<Series>> {
    let values = ds.string_values(col)?;
    let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
    if categories.is_empty() {
        warn!("'{}' has no categories to encode; no indicator columns added", col);
        return Ok(Vec::new());
    }

    Ok(categories
        .into_iter()
        .skip(1)
        .map(|category| {
            let indicator: Vec<i32> = values
                .iter()
                .map(|v| i32::from(v.as_deref() == Some(category)))
                .collect();
            Series::new(format!("{}_{}", col, category).into(), indicator)
        })
        .collect())
}
