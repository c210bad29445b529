//! Comparison key extraction

use super::table::{CellValue, Dataset, Row};
use crate::error::{CompareError, Result};

/// One component of a comparison key.
///
/// `Empty` stands for a missing or null cell. It equals other empty parts
/// in the same position and differs from every real value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPart<'a> {
    Empty,
    Value(&'a CellValue),
}

impl<'a> From<Option<&'a CellValue>> for KeyPart<'a> {
    fn from(cell: Option<&'a CellValue>) -> Self {
        match cell {
            None | Some(CellValue::Null) => KeyPart::Empty,
            Some(value) => KeyPart::Value(value),
        }
    }
}

/// Composite key built from the selected cells of a row, in selection order.
///
/// Keys compare part by part with strict value equality, so two distinct
/// value tuples can never produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey<'a>(Vec<KeyPart<'a>>);

impl<'a> ComparisonKey<'a> {
    /// Key parts in selection order
    pub fn parts(&self) -> &[KeyPart<'a>] {
        &self.0
    }
}

impl std::fmt::Display for ComparisonKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match part {
                KeyPart::Empty => f.write_str("<empty>")?,
                KeyPart::Value(v) => write!(f, "{:?}", v)?,
            }
        }
        f.write_str(")")
    }
}

/// Extracts comparison keys from the rows of one dataset
#[derive(Debug, Clone)]
pub struct KeyExtractor {
    column_indices: Vec<usize>,
}

impl KeyExtractor {
    /// Resolve `columns` against the dataset schema, in order
    pub fn new(dataset: &Dataset, columns: &[String]) -> Result<Self> {
        if columns.is_empty() {
            return Err(CompareError::EmptySelection);
        }

        let column_indices = columns
            .iter()
            .map(|name| {
                dataset
                    .column_index(name)
                    .ok_or_else(|| CompareError::UnknownColumn {
                        column: name.clone(),
                        dataset: dataset.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { column_indices })
    }

    /// Derive the comparison key of a row
    pub fn extract<'a>(&self, row: &'a Row) -> ComparisonKey<'a> {
        ComparisonKey(
            self.column_indices
                .iter()
                .map(|&i| KeyPart::from(row.get(i)))
                .collect(),
        )
    }
}
