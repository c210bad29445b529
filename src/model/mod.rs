//! Data model for tabular data representation

mod key;
mod schema;
mod selection;
mod table;

pub use key::{ComparisonKey, KeyExtractor, KeyPart};
pub use schema::{columns_from_names, Column};
pub use selection::ColumnSelection;
pub use table::{CellValue, Dataset, Row};
