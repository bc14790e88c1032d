//! Churn Dataset Cleaning Library
//!
//! Prepares a customer churn table for model training, built on Polars.
//!
//! # Overview
//!
//! A run applies four stages in a fixed order, each to the table left by the
//! previous one:
//!
//! - **Imputation**: mode fill for categorical columns (the designated one is
//!   also lowercased), mean fill for numeric columns, then rows missing a
//!   required key are dropped
//! - **Flag normalization**: configured flag columns are coerced to numbers,
//!   mode filled and thresholded into {0, 1}
//! - **Outlier handling**: IQR rule per numeric column, replacing outliers
//!   with the median or removing their rows
//! - **Scaling**: min-max scaling of numeric columns into [0, 1]
//!
//! Identifier and flag columns are never treated as numeric features.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use churn_prep::{CleaningPipeline, PipelineConfig, io};
//!
//! let df = io::load_csv("data/churn.csv")?;
//!
//! let result = CleaningPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! let mut cleaned = result.dataset.into_frame();
//! io::write_csv(&mut cleaned, "output/cleaned_churn_data.csv")?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use churn_prep::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .binary_columns(["HasCrCard", "IsActiveMember", "Churn"])
//!     .categorical_column("Gender")
//!     .id_columns(["CustomerID"])
//!     .require_target(true)                     // also drop rows without Churn
//!     .outlier_strategy(OutlierStrategy::Remove)
//!     .iqr_multiplier(3.0)
//!     .empty_column_policy(EmptyColumnPolicy::FillDefault)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod training;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::BinaryNormalizer;
pub use config::{
    ConfigValidationError, EmptyColumnPolicy, OutlierStrategy, PipelineConfig,
    PipelineConfigBuilder,
};
pub use dataset::{ColumnKind, Dataset};
pub use error::{CleaningError, ResultExt};
pub use imputers::MissingValueImputer;
pub use io::{load_csv, write_csv};
pub use pipeline::{
    CleaningPipeline, CleaningResult, CleaningStage, ClosureProgressReporter, FeatureScaler,
    OutlierFilter, PipelineBuilder, ProgressReporter, ProgressUpdate, ScalingOutcome,
};
pub use profiler::{ColumnProfile, DataProfiler, DatasetProfile};
pub use reporting::{CleaningReport, ReportGenerator};
pub use training::TrainingFrame;
pub use types::{ActionType, CleaningAction, CleaningSummary};
