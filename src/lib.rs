//! rowsift - find the rows of one table that have no match in another
//!
//! Loads two tabular files (CSV, Excel, JSON), derives a comparison key from
//! the selected columns of every row, and reports the rows of the first file
//! whose key never occurs in the second.

pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;

pub use compare::{find_unmatched, ComparisonEngine, ResultSet};
pub use config::Config;
pub use error::CompareError;
pub use model::{ColumnSelection, Dataset};
