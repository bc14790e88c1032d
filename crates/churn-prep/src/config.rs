//! Configuration types for the cleaning pipeline.
//!
//! Column names are a contract between the loader and the pipeline, so all of
//! them are configurable here. Defaults match the customer-churn export.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default flag columns coerced into {0, 1}.
pub const DEFAULT_BINARY_COLUMNS: [&str; 3] = ["HasCrCard", "IsActiveMember", "Churn"];

/// Default demographic column that gets mode imputation and lowercasing.
pub const DEFAULT_CATEGORICAL_COLUMN: &str = "Gender";

/// Default label column.
pub const DEFAULT_TARGET_COLUMN: &str = "Churn";

/// Default identifier column.
pub const DEFAULT_ID_COLUMN: &str = "CustomerID";

/// Default file name (without extension) for the cleaned dataset.
pub const DEFAULT_OUTPUT_NAME: &str = "cleaned_churn_data";

/// Strategy for handling outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutlierStrategy {
    /// Replace values outside the IQR bounds with the column median
    #[default]
    Median,
    /// Remove rows whose value falls outside the IQR bounds, column by column
    Remove,
}

/// What to do when a column that needs a fill statistic has no values at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptyColumnPolicy {
    /// Fail with `CleaningError::NoValidValues`
    #[default]
    Fail,
    /// Fill numeric and flag columns with 0 and categorical columns with "unknown"
    FillDefault,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use churn_prep::config::{PipelineConfig, OutlierStrategy};
///
/// let config = PipelineConfig::builder()
///     .outlier_strategy(OutlierStrategy::Remove)
///     .require_target(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Columns coerced into the {0, 1} domain, in processing order.
    /// Default: HasCrCard, IsActiveMember, Churn
    pub binary_columns: Vec<String>,

    /// Categorical column that is mode-imputed and lowercased, if present.
    /// Default: "Gender"
    pub categorical_column: Option<String>,

    /// Label column.
    /// Default: "Churn"
    pub target_column: String,

    /// Identifier columns. Rows missing any of them are dropped.
    /// Default: ["CustomerID"]
    pub id_columns: Vec<String>,

    /// Also drop rows with a missing label during imputation.
    /// Default: false
    pub require_target: bool,

    /// Strategy for handling outliers in numeric columns.
    /// Default: Median
    pub outlier_strategy: OutlierStrategy,

    /// Multiplier applied to the IQR when computing the outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Behaviour for all-missing columns.
    /// Default: Fail
    pub empty_column_policy: EmptyColumnPolicy,

    /// Whether to min-max scale numeric columns.
    /// Default: true
    pub scale_features: bool,

    /// Output directory for the cleaned data and reports.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Output file name (without extension).
    /// Default: "cleaned_churn_data"
    pub output_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            binary_columns: DEFAULT_BINARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            categorical_column: Some(DEFAULT_CATEGORICAL_COLUMN.to_string()),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            id_columns: vec![DEFAULT_ID_COLUMN.to_string()],
            require_target: false,
            outlier_strategy: OutlierStrategy::default(),
            iqr_multiplier: 1.5,
            empty_column_policy: EmptyColumnPolicy::default(),
            scale_features: true,
            output_dir: PathBuf::from("output"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Columns that must be present on every row.
    pub fn required_key_columns(&self) -> Vec<String> {
        let mut keys = self.id_columns.clone();
        if self.require_target && !keys.contains(&self.target_column) {
            keys.push(self.target_column.clone());
        }
        keys
    }

    /// Full path of the cleaned CSV file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.output_name))
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.binary_columns {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName("binary_columns"));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigValidationError::DuplicateBinaryColumn(name.clone()));
            }
        }

        if self.id_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("id_columns"));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("target_column"));
        }

        if self.id_columns.contains(&self.target_column) {
            return Err(ConfigValidationError::TargetIsIdentifier(
                self.target_column.clone(),
            ));
        }

        if self.output_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("output_name"));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Empty name in '{0}'")]
    EmptyColumnName(&'static str),

    #[error("Binary column '{0}' is listed more than once")]
    DuplicateBinaryColumn(String),

    #[error("Target column '{0}' cannot also be an identifier column")]
    TargetIsIdentifier(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    binary_columns: Option<Vec<String>>,
    categorical_column: Option<Option<String>>,
    target_column: Option<String>,
    id_columns: Option<Vec<String>>,
    require_target: Option<bool>,
    outlier_strategy: Option<OutlierStrategy>,
    iqr_multiplier: Option<f64>,
    empty_column_policy: Option<EmptyColumnPolicy>,
    scale_features: Option<bool>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl PipelineConfigBuilder {
    /// Set the flag columns coerced into {0, 1}.
    pub fn binary_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical column that is mode-imputed and lowercased.
    pub fn categorical_column(mut self, column: impl Into<String>) -> Self {
        self.categorical_column = Some(Some(column.into()));
        self
    }

    /// Disable the designated categorical column handling.
    pub fn no_categorical_column(mut self) -> Self {
        self.categorical_column = Some(None);
        self
    }

    /// Set the label column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the identifier columns.
    pub fn id_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Drop rows with a missing label during imputation.
    pub fn require_target(mut self, require: bool) -> Self {
        self.require_target = Some(require);
        self
    }

    /// Set the strategy for handling outliers.
    pub fn outlier_strategy(mut self, strategy: OutlierStrategy) -> Self {
        self.outlier_strategy = Some(strategy);
        self
    }

    /// Set the IQR multiplier used for the outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the policy for all-missing columns.
    pub fn empty_column_policy(mut self, policy: EmptyColumnPolicy) -> Self {
        self.empty_column_policy = Some(policy);
        self
    }

    /// Enable or disable min-max scaling.
    pub fn scale_features(mut self, scale: bool) -> Self {
        self.scale_features = Some(scale);
        self
    }

    /// Set the output directory for cleaned data and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the output file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            binary_columns: self.binary_columns.unwrap_or(defaults.binary_columns),
            categorical_column: self
                .categorical_column
                .unwrap_or(defaults.categorical_column),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            id_columns: self.id_columns.unwrap_or(defaults.id_columns),
            require_target: self.require_target.unwrap_or(defaults.require_target),
            outlier_strategy: self.outlier_strategy.unwrap_or_default(),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            empty_column_policy: self.empty_column_policy.unwrap_or_default(),
            scale_features: self.scale_features.unwrap_or(defaults.scale_features),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name.unwrap_or(defaults.output_name),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.binary_columns,
            vec!["HasCrCard", "IsActiveMember", "Churn"]
        );
        assert_eq!(config.categorical_column.as_deref(), Some("Gender"));
        assert_eq!(config.target_column, "Churn");
        assert_eq!(config.id_columns, vec!["CustomerID"]);
        assert_eq!(config.outlier_strategy, OutlierStrategy::Median);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert!(config.scale_features);
        assert!(!config.require_target);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::Fail);
        assert_eq!(config.output_path(), PathBuf::from("output/cleaned_churn_data.csv"));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .binary_columns(["Exited"])
            .target_column("Exited")
            .id_columns(["RowNumber", "CustomerId"])
            .no_categorical_column()
            .outlier_strategy(OutlierStrategy::Remove)
            .iqr_multiplier(3.0)
            .scale_features(false)
            .build()
            .unwrap();

        assert_eq!(config.binary_columns, vec!["Exited"]);
        assert_eq!(config.target_column, "Exited");
        assert_eq!(config.id_columns, vec!["RowNumber", "CustomerId"]);
        assert!(config.categorical_column.is_none());
        assert_eq!(config.outlier_strategy, OutlierStrategy::Remove);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert!(!config.scale_features);
    }

    #[test]
    fn test_required_key_columns() {
        let lenient = PipelineConfig::default();
        assert_eq!(lenient.required_key_columns(), vec!["CustomerID"]);

        let strict = PipelineConfig::builder().require_target(true).build().unwrap();
        assert_eq!(strict.required_key_columns(), vec!["CustomerID", "Churn"]);
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = PipelineConfig::builder().iqr_multiplier(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));

        let result = PipelineConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_duplicate_binary_column() {
        let result = PipelineConfig::builder()
            .binary_columns(["Churn", "Churn"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateBinaryColumn(name) if name == "Churn"
        ));
    }

    #[test]
    fn test_validation_target_is_identifier() {
        let result = PipelineConfig::builder()
            .id_columns(["Churn"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::TargetIsIdentifier(_)
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.binary_columns, deserialized.binary_columns);
        assert_eq!(config.outlier_strategy, deserialized.outlier_strategy);
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "binary_columns": ["HasCrCard", "Churn"],
            "categorical_column": null,
            "target_column": "Churn",
            "id_columns": ["CustomerID"],
            "require_target": true,
            "outlier_strategy": "Remove",
            "iqr_multiplier": 2.0,
            "empty_column_policy": "FillDefault",
            "scale_features": false,
            "output_dir": "custom_output",
            "output_name": "churn_clean"
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");

        assert_eq!(config.binary_columns, vec!["HasCrCard", "Churn"]);
        assert!(config.categorical_column.is_none());
        assert!(config.require_target);
        assert_eq!(config.outlier_strategy, OutlierStrategy::Remove);
        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::FillDefault);
        assert!(!config.scale_features);
        assert_eq!(
            config.output_path(),
            PathBuf::from("custom_output/churn_clean.csv")
        );
    }
}
