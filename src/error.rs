//! Error types for the comparison engine

use thiserror::Error;

/// Result type alias for comparison operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Errors raised by the comparison engine.
///
/// Every variant except `Cancelled` is a precondition failure: it is
/// reported before any row is scanned and before any progress callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// A dataset cannot be compared (e.g. it has rows but no column schema)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No comparison column was selected
    #[error("Column selection is empty: select at least one column to compare")]
    EmptySelection,

    /// The same column appears twice in one side of the selection
    #[error("Column '{0}' is selected more than once")]
    DuplicateColumn(String),

    /// Different column names on each side with more than one column
    #[error("Different column names per dataset are only supported with a single key column (got {left} and {right})")]
    AsymmetricSelection { left: usize, right: usize },

    /// A selected column does not exist in the dataset's schema
    #[error("Column '{column}' not found in {dataset}")]
    UnknownColumn { column: String, dataset: String },

    /// The scan was stopped through its cancellation token
    #[error("Comparison cancelled")]
    Cancelled,
}

impl CompareError {
    /// True for errors caused by the column selection
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CompareError::EmptySelection
                | CompareError::DuplicateColumn(_)
                | CompareError::AsymmetricSelection { .. }
                | CompareError::UnknownColumn { .. }
        )
    }

    /// True for errors caused by the datasets themselves
    pub fn is_input_error(&self) -> bool {
        matches!(self, CompareError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_groups() {
        assert!(CompareError::EmptySelection.is_configuration_error());
        assert!(CompareError::UnknownColumn {
            column: "id".into(),
            dataset: "a.csv".into()
        }
        .is_configuration_error());
        assert!(CompareError::InvalidInput("no columns".into()).is_input_error());
        assert!(!CompareError::Cancelled.is_configuration_error());
        assert!(!CompareError::Cancelled.is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = CompareError::UnknownColumn {
            column: "email".into(),
            dataset: "clients.xlsx".into(),
        };
        assert_eq!(err.to_string(), "Column 'email' not found in clients.xlsx");
    }
}
