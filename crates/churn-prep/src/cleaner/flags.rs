use super::converters::{coerce_to_f64, threshold_flag};
use crate::config::{EmptyColumnPolicy, PipelineConfig};
use crate::dataset::{ColumnKind, Dataset};
use crate::error::{CleaningError, Result};
use crate::profiler::statistics::{numeric_mode, present};
use crate::types::{ActionType, CleaningAction};
use polars::prelude::*;
use tracing::{debug, info};

/// Forces the configured flag columns into {0, 1}.
#[derive(Debug, Clone)]
pub struct BinaryNormalizer {
    columns: Vec<String>,
    empty_column_policy: EmptyColumnPolicy,
}

impl BinaryNormalizer {
    pub fn new(columns: Vec<String>, empty_column_policy: EmptyColumnPolicy) -> Self {
        Self {
            columns,
            empty_column_policy,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.binary_columns.clone(), config.empty_column_policy)
    }

    /// Normalize every configured column, in configuration order.
    ///
    /// Fails with [`CleaningError::ColumnNotFound`] before touching anything
    /// if a configured column is absent.
    pub fn normalize(&self, ds: &mut Dataset, actions: &mut Vec<CleaningAction>) -> Result<()> {
        if let Some(missing) = self.columns.iter().find(|c| !ds.has_column(c)) {
            return Err(CleaningError::ColumnNotFound(missing.clone()));
        }

        for col in &self.columns {
            self.normalize_column(ds, col, actions)?;
        }

        info!("Binary columns normalized");
        Ok(())
    }

    fn normalize_column(
        &self,
        ds: &mut Dataset,
        col: &str,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<()> {
        let parsed = coerce_to_f64(ds.column(col)?)?;

        let fill = match numeric_mode(&present(&parsed)) {
            Some(m) => m,
            None if parsed.is_empty() => 0.0,
            None => match self.empty_column_policy {
                EmptyColumnPolicy::Fail => return Err(CleaningError::NoValidValues(col.to_string())),
                EmptyColumnPolicy::FillDefault => 0.0,
            },
        };

        let mut filled = 0;
        let mut changed = 0;
        let flags: Vec<i64> = parsed
            .iter()
            .map(|v| {
                let value = v.unwrap_or_else(|| {
                    filled += 1;
                    fill
                });
                let flag = threshold_flag(value);
                if v.is_none() || flag as f64 != value {
                    changed += 1;
                }
                flag
            })
            .collect();

        ds.replace_column(col, Series::new(col.into(), flags))?;
        ds.set_kind(col, ColumnKind::Flag)?;

        debug!(
            "Normalized '{}': {} filled with {}, {} values changed",
            col, filled, fill, changed
        );
        if changed > 0 {
            actions.push(
                CleaningAction::new(
                    ActionType::FlagCoerced,
                    col,
                    changed,
                    format!("Coerced {} values in '{}' to 0/1", changed, col),
                )
                .with_details(format!("{} missing filled with mode {}", filled, fill)),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(ds: &Dataset, col: &str) -> Vec<Option<i64>> {
        ds.column(col).unwrap().i64().unwrap().into_iter().collect()
    }

    fn normalizer(columns: &[&str]) -> BinaryNormalizer {
        BinaryNormalizer::new(
            columns.iter().map(|c| c.to_string()).collect(),
            EmptyColumnPolicy::Fail,
        )
    }

    #[test]
    fn test_mixed_values_scenario() {
        let df = df!["HasCrCard" => [Some("1"), Some("-3"), Some("x"), Some("0")]].unwrap();
        let mut ds = Dataset::from_frame(df);
        let mut actions = vec![];

        normalizer(&["HasCrCard"]).normalize(&mut ds, &mut actions).unwrap();

        // "x" is missing, mode of [1, -3, 0] is 1 (first seen).
        assert_eq!(flags(&ds, "HasCrCard"), vec![Some(1), Some(0), Some(1), Some(0)]);
        assert_eq!(ds.kind("HasCrCard").unwrap(), ColumnKind::Flag);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::FlagCoerced);
        assert_eq!(actions[0].affected, 2);
    }

    #[test]
    fn test_nulls_filled_with_mode() {
        let df = df!["Churn" => [Some(0i64), Some(1), Some(0), None]].unwrap();
        let mut ds = Dataset::from_frame(df);
        normalizer(&["Churn"]).normalize(&mut ds, &mut vec![]).unwrap();
        assert_eq!(flags(&ds, "Churn"), vec![Some(0), Some(1), Some(0), Some(0)]);
    }

    #[test]
    fn test_floats_and_booleans() {
        let df = df![
            "IsActiveMember" => [0.7, 0.0, -1.0],
            "HasCrCard" => [true, false, true],
        ]
        .unwrap();
        let mut ds = Dataset::from_frame(df);
        normalizer(&["IsActiveMember", "HasCrCard"])
            .normalize(&mut ds, &mut vec![])
            .unwrap();
        assert_eq!(flags(&ds, "IsActiveMember"), vec![Some(1), Some(0), Some(0)]);
        assert_eq!(flags(&ds, "HasCrCard"), vec![Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn test_idempotent() {
        let df = df!["Churn" => [Some("2"), None, Some("0"), Some("2")]].unwrap();
        let mut ds = Dataset::from_frame(df);
        let n = normalizer(&["Churn"]);
        n.normalize(&mut ds, &mut vec![]).unwrap();
        let once = flags(&ds, "Churn");

        let mut actions = vec![];
        n.normalize(&mut ds, &mut actions).unwrap();
        assert_eq!(flags(&ds, "Churn"), once);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_missing_column_fails_before_any_change() {
        let df = df!["HasCrCard" => [Some("5"), Some("0")]].unwrap();
        let mut ds = Dataset::from_frame(df);
        let err = normalizer(&["HasCrCard", "Churn"])
            .normalize(&mut ds, &mut vec![])
            .unwrap_err();
        assert!(matches!(err, CleaningError::ColumnNotFound(c) if c == "Churn"));
        assert_eq!(ds.column("HasCrCard").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_all_missing_policy() {
        let df = df!["Churn" => [Some("x"), None]].unwrap();

        let mut ds = Dataset::from_frame(df.clone());
        assert!(matches!(
            normalizer(&["Churn"]).normalize(&mut ds, &mut vec![]),
            Err(CleaningError::NoValidValues(_))
        ));

        let mut ds = Dataset::from_frame(df);
        BinaryNormalizer::new(vec!["Churn".to_string()], EmptyColumnPolicy::FillDefault)
            .normalize(&mut ds, &mut vec![])
            .unwrap();
        assert_eq!(flags(&ds, "Churn"), vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_empty_table_is_noop() {
        let df = df!["Churn" => Vec::<i64>::new()].unwrap();
        let mut ds = Dataset::from_frame(df);
        normalizer(&["Churn"]).normalize(&mut ds, &mut vec![]).unwrap();
        assert_eq!(ds.height(), 0);
    }
}
