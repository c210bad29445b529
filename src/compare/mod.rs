//! Comparison engine: rows of the first dataset with no key match in the second

mod index;
mod progress;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{CompareError, Result};
use crate::model::{ColumnSelection, Column, Dataset, KeyExtractor, Row};

pub use index::KeyIndex;
pub use progress::{percent_of, CancellationToken, ProgressTracker};

/// Statistics about a comparison run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CompareStats {
    /// Rows in the first dataset
    pub first_row_count: usize,
    /// Rows in the second dataset
    pub second_row_count: usize,
    /// Distinct keys found in the second dataset
    pub distinct_keys: usize,
    /// Rows of the first dataset with no match
    pub rows_unmatched: usize,
    /// Rows of the first dataset with a match
    pub rows_matched: usize,
}

/// Rows of the first dataset that have no equivalent key in the second,
/// in their original order
#[derive(Debug, Clone)]
pub struct ResultSet<'a> {
    source: &'a Dataset,
    rows: Vec<&'a Row>,
    /// Statistics
    pub stats: CompareStats,
}

impl<'a> ResultSet<'a> {
    fn empty(source: &'a Dataset) -> Self {
        Self {
            source,
            rows: Vec::new(),
            stats: CompareStats::default(),
        }
    }

    /// The dataset the rows were taken from
    pub fn source(&self) -> &'a Dataset {
        self.source
    }

    /// Schema of the result rows
    pub fn columns(&self) -> &'a [Column] {
        &self.source.columns
    }

    /// Unmatched rows, borrowed from the first dataset
    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Row> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Human-readable summary of the outcome
    pub fn status_message(&self) -> String {
        match self.rows.len() {
            0 => "No unmatched rows found.".to_string(),
            1 => "Found 1 unmatched row.".to_string(),
            n => format!("Found {} unmatched rows.", n),
        }
    }
}

/// Main comparison engine
#[derive(Default)]
pub struct ComparisonEngine<'p> {
    progress: Option<Box<dyn FnMut(u8) + 'p>>,
    cancel: Option<CancellationToken>,
}

impl<'p> ComparisonEngine<'p> {
    /// Create an engine with no progress reporting and no cancellation
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive the completion percentage while the first dataset is scanned
    pub fn with_progress(mut self, callback: impl FnMut(u8) + 'p) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Stop the scan once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Find the rows of `first` whose key does not occur in `second`.
    ///
    /// The selection is checked against both schemas before any row is
    /// read; a failed check reports no progress at all.
    pub fn compare<'a>(
        &mut self,
        first: &'a Dataset,
        second: &Dataset,
        selection: &ColumnSelection,
    ) -> Result<ResultSet<'a>> {
        selection.validate()?;
        let first_extractor = resolve_columns(first, selection.left())?;
        let second_extractor = resolve_columns(second, selection.right())?;

        debug!(
            first = %first.name,
            second = %second.name,
            selection = %selection,
            "comparison started"
        );

        let Some(first_extractor) = first_extractor.filter(|_| !first.is_empty()) else {
            debug!(dataset = %first.name, "first dataset is empty, skipping index build");
            ProgressTracker::new(0, self.progress.as_deref_mut()).finish();
            let mut result = ResultSet::empty(first);
            result.stats.second_row_count = second.row_count();
            return Ok(result);
        };

        let index = match second_extractor {
            Some(extractor) => KeyIndex::build(second, &extractor),
            None => KeyIndex::empty(),
        };

        self.scan(first, &index, &first_extractor)
    }

    /// Scan `first` against an already built index
    pub fn scan<'a>(
        &mut self,
        first: &'a Dataset,
        index: &KeyIndex<'_>,
        extractor: &KeyExtractor,
    ) -> Result<ResultSet<'a>> {
        let mut tracker = ProgressTracker::new(first.row_count(), self.progress.as_deref_mut());
        let mut result = ResultSet::empty(first);

        for row in &first.rows {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                info!(dataset = %first.name, "comparison cancelled");
                return Err(CompareError::Cancelled);
            }

            let key = extractor.extract(row);
            if !index.contains(&key) {
                trace!(line = row.source_line, key = %key, "no match");
                result.rows.push(row);
            }
            tracker.advance();
        }
        tracker.finish();

        result.stats = CompareStats {
            first_row_count: first.row_count(),
            second_row_count: index.source_rows(),
            distinct_keys: index.len(),
            rows_unmatched: result.rows.len(),
            rows_matched: first.row_count() - result.rows.len(),
        };

        info!(
            dataset = %first.name,
            scanned = first.row_count(),
            unmatched = result.rows.len(),
            "comparison finished"
        );

        Ok(result)
    }
}

/// Resolve the selected columns against a dataset's schema.
///
/// A dataset with neither rows nor columns has nothing to resolve against
/// and yields `None`; rows without a schema are invalid input.
fn resolve_columns(dataset: &Dataset, columns: &[String]) -> Result<Option<KeyExtractor>> {
    if !dataset.has_schema() {
        if dataset.is_empty() {
            return Ok(None);
        }
        return Err(CompareError::InvalidInput(format!(
            "{} has {} rows but no column names",
            dataset.name,
            dataset.row_count()
        )));
    }
    KeyExtractor::new(dataset, columns).map(Some)
}

/// Convenience function to find unmatched rows with the default engine
pub fn find_unmatched<'a>(
    first: &'a Dataset,
    second: &Dataset,
    selection: &ColumnSelection,
) -> Result<ResultSet<'a>> {
    ComparisonEngine::new().compare(first, second, selection)
}
