//! Membership index over the keys of the second dataset

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::model::{ComparisonKey, Dataset, KeyExtractor};

/// Set of every comparison key present in a dataset
#[derive(Debug, Default)]
pub struct KeyIndex<'a> {
    keys: FxHashSet<ComparisonKey<'a>>,
    source_rows: usize,
}

impl<'a> KeyIndex<'a> {
    /// Build the index from every row of `dataset`.
    ///
    /// Duplicate keys collapse; only presence is recorded.
    pub fn build(dataset: &'a Dataset, extractor: &KeyExtractor) -> Self {
        let mut keys =
            FxHashSet::with_capacity_and_hasher(dataset.row_count(), Default::default());
        for row in &dataset.rows {
            keys.insert(extractor.extract(row));
        }

        debug!(
            dataset = %dataset.name,
            rows = dataset.row_count(),
            distinct_keys = keys.len(),
            "built key index"
        );

        Self {
            keys,
            source_rows: dataset.row_count(),
        }
    }

    /// An index that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether a key occurs in the indexed dataset
    pub fn contains<'k>(&self, key: &ComparisonKey<'k>) -> bool
    where
        'a: 'k,
    {
        let keys: &FxHashSet<ComparisonKey<'k>> = &self.keys;
        keys.contains(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of rows the index was built from
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }
}
