use serde::{Deserialize, Serialize};

// ============================================================================
// Cleaning Summary Types
// ============================================================================

/// Human-readable summary of what the pipeline did.
///
/// # Example
///
/// ```rust,ignore
/// let summary = result.summary;
/// println!("Cleaned {} rows in {}ms", summary.rows_after, summary.duration_ms);
/// for action in &summary.actions {
///     println!("[{}] {}", action.action_type.display_name(), action.description);
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before cleaning.
    pub rows_before: usize,
    /// Number of rows after cleaning.
    pub rows_after: usize,
    /// Number of rows removed during cleaning.
    pub rows_removed: usize,

    /// Number of columns (cleaning never adds or removes columns).
    pub columns: usize,

    /// Missing cells before cleaning.
    pub missing_before: usize,
    /// Missing cells after cleaning.
    pub missing_after: usize,

    /// List of actions taken, in execution order.
    pub actions: Vec<CleaningAction>,

    /// Diagnostics that did not stop the pipeline.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Actions of one type.
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &CleaningAction> {
        self.actions
            .iter()
            .filter(move |a| a.action_type == action_type)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f32 / self.rows_before as f32) * 100.0
        }
    }
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Number of cells or rows affected.
    pub affected: usize,
    /// Additional details (e.g., fill value, bounds used).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    /// Create a new cleaning action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        affected: usize,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            affected,
            details: None,
        }
    }

    /// Add details to the action.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Missing values were imputed.
    ValueImputed,
    /// Categorical values were rewritten to a canonical case.
    CaseNormalized,
    /// One or more rows were removed from the dataset.
    RowsRemoved,
    /// A flag column was coerced into {0, 1}.
    FlagCoerced,
    /// Outliers were replaced or their rows removed.
    OutlierHandled,
    /// A column was min-max scaled.
    DataScaled,
    /// A zero-variance column was mapped to a constant.
    DegenerateColumn,
    /// A stage was skipped.
    StageSkipped,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ValueImputed => "Value Imputed",
            Self::CaseNormalized => "Case Normalized",
            Self::RowsRemoved => "Rows Removed",
            Self::FlagCoerced => "Flag Coerced",
            Self::OutlierHandled => "Outlier Handled",
            Self::DataScaled => "Data Scaled",
            Self::DegenerateColumn => "Degenerate Column",
            Self::StageSkipped => "Stage Skipped",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaning_summary_default() {
        let summary = CleaningSummary::default();
        assert_eq!(summary.duration_ms, 0);
        assert_eq!(summary.rows_before, 0);
        assert!(summary.actions.is_empty());
    }

    #[test]
    fn test_cleaning_summary_actions_of() {
        let mut summary = CleaningSummary::new();
        summary.actions.push(CleaningAction::new(
            ActionType::ValueImputed,
            "Age",
            3,
            "Filled 3 missing values with mean",
        ));
        summary.actions.push(CleaningAction::new(
            ActionType::RowsRemoved,
            "dataset",
            1,
            "Dropped 1 row missing CustomerID",
        ));
        assert_eq!(summary.actions_of(ActionType::ValueImputed).count(), 1);
        assert_eq!(summary.actions_of(ActionType::DataScaled).count(), 0);
    }

    #[test]
    fn test_rows_removed_percentage() {
        let mut summary = CleaningSummary::new();
        assert_eq!(summary.rows_removed_percentage(), 0.0);
        summary.rows_before = 200;
        summary.rows_removed = 50;
        assert!((summary.rows_removed_percentage() - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_action_with_details() {
        let action = CleaningAction::new(ActionType::OutlierHandled, "Balance", 2, "Replaced 2 outliers")
            .with_details("bounds [8, 16], median 12");
        assert_eq!(action.affected, 2);
        assert!(action.details.unwrap().contains("median"));
    }

    #[test]
    fn test_action_types_serialize_snake_case() {
        let json = serde_json::to_string(&ActionType::DegenerateColumn).unwrap();
        assert_eq!(json, "\"degenerate_column\"");
        let json = serde_json::to_string(&ActionType::FlagCoerced).unwrap();
        assert_eq!(json, "\"flag_coerced\"");
    }

    #[test]
    fn test_summary_serialization() {
        let mut summary = CleaningSummary::new();
        summary.duration_ms = 1500;
        summary.add_warning("Dataset is empty; scaling skipped");
        let json = serde_json::to_string(&summary).unwrap();
        let back: CleaningSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.duration_ms, 1500);
        assert_eq!(back.warnings.len(), 1);
    }
}
