//! Main cleaning pipeline module.
//!
//! This module provides the core `CleaningPipeline` struct and builder for
//! running the four cleaning stages in order.

use crate::cleaner::BinaryNormalizer;
use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result, ResultExt};
use crate::imputers::MissingValueImputer;
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::scaling::{FeatureScaler, ScalingOutcome};
use crate::types::{ActionType, CleaningAction, CleaningSummary};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// The cleaned table, with its column kinds.
    pub dataset: Dataset,
    pub summary: CleaningSummary,
    /// `None` when scaling is disabled.
    pub scaling: Option<ScalingOutcome>,
}

/// The churn data cleaning pipeline.
///
/// Stages run in a fixed order: imputation, flag normalization, outlier
/// handling, scaling. Each stage sees the table left by the previous one, and
/// the first error stops the run.
///
/// # Example
///
/// ```rust,ignore
/// use churn_prep::{CleaningPipeline, OutlierStrategy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .outlier_strategy(OutlierStrategy::Remove)
///     .build()?;
///
/// let result = CleaningPipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
/// ```
pub struct CleaningPipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    imputer: MissingValueImputer,
    normalizer: BinaryNormalizer,
    outlier_filter: OutlierFilter,
    scaler: FeatureScaler,
}

// The pipeline is moved onto worker threads by callers.
static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean a DataFrame.
    ///
    /// # Errors
    ///
    /// Returns the first stage error. A `Failed` progress update is reported
    /// before returning.
    pub fn process(&self, df: DataFrame) -> Result<CleaningResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage_started(&self, stage: CleaningStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn stage_finished(&self, stage: CleaningStage, message: impl Into<String>) {
        self.report_progress(ProgressUpdate::new(stage, 1.0, message));
    }

    /// Sub-stage update for each column a column-wise stage visits.
    fn column_progress(&self, stage: CleaningStage) -> impl FnMut(&str, usize, usize) + '_ {
        move |column: &str, index: usize, total: usize| {
            self.report_progress(ProgressUpdate::with_sub_stage(
                stage,
                format!("Column: {}", column),
                index as f32 / total.max(1) as f32,
                format!("Processing '{}' ({}/{})", column, index + 1, total),
            ));
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline...");
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));

        let mut ds = Dataset::with_roles(df, &self.config);
        let mut summary = CleaningSummary::new();
        summary.rows_before = ds.height();
        summary.columns = ds.width();
        summary.missing_before = ds.total_missing()?;

        let mut actions: Vec<CleaningAction> = Vec::new();

        // Step 1: Missing values
        self.stage_started(CleaningStage::Imputation, "Step 1: Handling missing values...");
        let dropped = self
            .imputer
            .impute(&mut ds, &mut actions)
            .context("Missing value imputation")?;
        self.stage_finished(
            CleaningStage::Imputation,
            format!("Missing values handled ({} rows dropped)", dropped),
        );

        // Step 2: Flag columns
        self.stage_started(CleaningStage::Normalization, "Step 2: Normalizing binary columns...");
        self.normalizer
            .normalize(&mut ds, &mut actions)
            .context("Binary normalization")?;
        self.stage_finished(CleaningStage::Normalization, "Binary columns normalized");

        // Step 3: Outliers
        self.stage_started(CleaningStage::OutlierHandling, "Step 3: Handling outliers...");
        let handled = self
            .outlier_filter
            .apply_with_progress(
                &mut ds,
                &mut actions,
                &mut self.column_progress(CleaningStage::OutlierHandling),
            )
            .context("Outlier handling")?;
        self.stage_finished(
            CleaningStage::OutlierHandling,
            format!("Outliers handled ({} affected)", handled),
        );

        // Step 4: Scaling
        let scaling = if self.config.scale_features {
            self.stage_started(CleaningStage::Scaling, "Step 4: Scaling numeric features...");
            let outcome = self
                .scaler
                .scale_with_progress(
                    &mut ds,
                    &mut actions,
                    &mut self.column_progress(CleaningStage::Scaling),
                )
                .context("Feature scaling")?;
            if outcome == ScalingOutcome::SkippedEmpty {
                summary.add_warning("Dataset is empty after cleaning; scaling skipped");
                actions.push(CleaningAction::new(
                    ActionType::StageSkipped,
                    "dataset",
                    0,
                    "Scaling skipped on empty dataset",
                ));
            }
            self.stage_finished(CleaningStage::Scaling, "Scaling complete");
            Some(outcome)
        } else {
            info!("Step 4: Skipping scaling (disabled)");
            None
        };

        summary.rows_after = ds.height();
        summary.rows_removed = summary.rows_before - summary.rows_after;
        summary.missing_after = ds.total_missing()?;
        summary.actions = actions;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        if summary.rows_after == 0 && summary.rows_before > 0 {
            warn!("All {} rows were removed during cleaning", summary.rows_before);
        }

        info!(
            "Cleaning complete: {} -> {} rows in {}ms",
            summary.rows_before, summary.rows_after, summary.duration_ms
        );

        Ok(CleaningResult {
            dataset: ds,
            summary,
            scaling,
        })
    }
}

/// Builder for [`CleaningPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<CleaningPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(CleaningError::from)?;

        Ok(CleaningPipeline {
            imputer: MissingValueImputer::from_config(&config),
            normalizer: BinaryNormalizer::from_config(&config),
            outlier_filter: OutlierFilter::from_config(&config),
            scaler: FeatureScaler::new(),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
