//! Report generation module.
//!
//! [`CleaningReport`] describes one run: the configuration used, the action
//! summary, column profiles before and after cleaning, flag distributions,
//! and the correlation matrix of the cleaned features.
//!
//! # Example
//!
//! ```rust,ignore
//! use churn_prep::reporting::{CleaningReport, ReportGenerator};
//!
//! let report = CleaningReport::build(&original, &result.dataset, &result.summary, &config)?;
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! ReportGenerator::new("output").write_report_to_file(&report, "churn")?;
//! ```

mod generator;

pub use generator::{CleaningReport, CorrelationMatrix, FlagDistribution, ReportGenerator};
