//! Output formatting for comparison results

mod html;
mod json;
mod terminal;

use std::io::Write;

use anyhow::Result;
use termcolor::ColorChoice;

use crate::compare::ResultSet;
use crate::config::OutputFormat;
use crate::model::{ColumnSelection, Dataset, Row};

pub use html::HtmlOutput;
pub(crate) use json::row_object;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Everything a formatter needs to describe one comparison run
#[derive(Debug, Clone, Copy)]
pub struct ComparisonReport<'a> {
    pub first: &'a Dataset,
    pub second: &'a Dataset,
    pub selection: &'a ColumnSelection,
    pub result: &'a ResultSet<'a>,
    /// Rows of each input to preview (0 for none)
    pub preview_rows: usize,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a comparison report to a writer
    fn render(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, color_choice: ColorChoice) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::with_color_choice(color_choice)),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Html => Box::new(HtmlOutput::new()),
        }
    }
}

/// Display strings for a row, one per schema column
pub(crate) fn display_cells(row: &Row, width: usize) -> Vec<String> {
    (0..width)
        .map(|i| row.get(i).map(|c| c.display().into_owned()).unwrap_or_default())
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::model::{columns_from_names, CellValue, Dataset};

    /// Two small datasets where rows 2 and 4 of the first are unmatched
    pub fn sample() -> (Dataset, Dataset) {
        let mut first = Dataset::new("clients.csv", columns_from_names(["id", "name"]));
        first.add_row(vec![CellValue::Int(1), CellValue::from("Ana")], 2);
        first.add_row(vec![CellValue::Int(2), CellValue::from("Luis")], 3);
        first.add_row(vec![CellValue::Int(3), CellValue::from("<Eva>")], 4);

        let mut second = Dataset::new("paid.csv", columns_from_names(["id"]));
        second.add_row(vec![CellValue::Int(2)], 2);

        (first, second)
    }
}
