//! Missing value handling.
//!
//! Categorical columns are filled with their mode, numeric columns with their
//! mean, and rows without a required key are dropped.

mod statistical;

pub use statistical::{DEFAULT_CATEGORY, MissingValueImputer};
