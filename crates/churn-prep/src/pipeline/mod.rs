//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its column-wise stages.

mod builder;
pub mod outliers;
pub mod progress;
pub mod scaling;

pub use builder::{CleaningPipeline, CleaningResult, PipelineBuilder};
pub use outliers::OutlierFilter;
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
pub use scaling::{FeatureScaler, ScalingOutcome};
