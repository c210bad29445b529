//! Column selection for key comparison

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, Result};

/// Ordered columns that make up the comparison key on each side.
///
/// Both sides hold the same names unless the selection was built with
/// [`ColumnSelection::paired`], which compares one differently named
/// column per dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    left: Vec<String>,
    right: Vec<String>,
}

impl ColumnSelection {
    /// Use the same ordered columns against both datasets
    pub fn shared<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let left: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self {
            right: left.clone(),
            left,
        }
    }

    /// Arbitrary columns per side; checked by [`ColumnSelection::validate`]
    pub fn new(left: Vec<String>, right: Vec<String>) -> Self {
        Self { left, right }
    }

    /// Compare `left` in the first dataset against `right` in the second
    pub fn paired(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: vec![left.into()],
            right: vec![right.into()],
        }
    }

    /// Columns read from the first dataset
    pub fn left(&self) -> &[String] {
        &self.left
    }

    /// Columns read from the second dataset
    pub fn right(&self) -> &[String] {
        &self.right
    }

    /// Number of key parts
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Check the selection on its own, without looking at any dataset
    pub fn validate(&self) -> Result<()> {
        if self.left.is_empty() || self.right.is_empty() {
            return Err(CompareError::EmptySelection);
        }

        if self.left != self.right && (self.left.len() != 1 || self.right.len() != 1) {
            return Err(CompareError::AsymmetricSelection {
                left: self.left.len(),
                right: self.right.len(),
            });
        }

        for side in [&self.left, &self.right] {
            let mut seen = FxHashSet::default();
            for name in side {
                if !seen.insert(name.as_str()) {
                    return Err(CompareError::DuplicateColumn(name.clone()));
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ColumnSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.left == self.right {
            write!(f, "{}", self.left.join(", "))
        } else {
            write!(f, "{} = {}", self.left.join(", "), self.right.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_selection() {
        let sel = ColumnSelection::shared(["a", "b"]);
        assert_eq!(sel.left(), sel.right());
        assert_eq!(sel.len(), 2);
        assert!(sel.validate().is_ok());
        assert_eq!(sel.to_string(), "a, b");
    }

    #[test]
    fn test_paired_selection() {
        let sel = ColumnSelection::paired("email", "correo");
        assert_eq!(sel.left(), ["email".to_string()]);
        assert_eq!(sel.right(), ["correo".to_string()]);
        assert!(sel.validate().is_ok());
        assert_eq!(sel.to_string(), "email = correo");
    }

    #[test]
    fn test_empty_selection_rejected() {
        let sel = ColumnSelection::shared(Vec::<String>::new());
        assert_eq!(sel.validate(), Err(CompareError::EmptySelection));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let sel = ColumnSelection::shared(["id", "name", "id"]);
        assert_eq!(
            sel.validate(),
            Err(CompareError::DuplicateColumn("id".into()))
        );
    }

    #[test]
    fn test_asymmetric_multi_column_rejected() {
        let sel = ColumnSelection::new(
            vec!["a".into(), "b".into()],
            vec!["c".into(), "d".into()],
        );
        assert_eq!(
            sel.validate(),
            Err(CompareError::AsymmetricSelection { left: 2, right: 2 })
        );
    }
}
