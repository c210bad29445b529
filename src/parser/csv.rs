//! CSV/TSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::Config;
use crate::model::{columns_from_names, CellValue, Dataset};

use super::{number_cell, text_cell, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Dataset> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        let delimiter = if is_tsv { b'\t' } else { b',' };

        read_dataset(BufReader::new(file), delimiter, path.display().to_string())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Read delimited text with a header row into a dataset
pub(crate) fn read_dataset<R: Read>(reader: R, delimiter: u8, name: String) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let mut dataset = Dataset::new(name, columns_from_names(headers.iter()));
    let width = dataset.column_count();
    let mut warned = false;

    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header

        let mut cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();

        if cells.len() > width {
            if !warned {
                warn!(
                    dataset = %dataset.name,
                    line = line_num + 2,
                    "row has more cells than the header; extra cells are ignored"
                );
                warned = true;
            }
            cells.truncate(width);
        }
        // Pad with nulls if row has fewer columns
        cells.resize(width, CellValue::Null);

        dataset.add_row(cells, line_num + 2);
    }

    Ok(dataset)
}

/// Parse a string value into a typed CellValue
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if let Some(number) = parse_number(trimmed) {
        return number;
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // ISO 8601 datetime
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    text_cell(trimmed)
}

/// Numbers written the way a number prints.
///
/// Codes such as `007`, `+7` or `-0` keep their spelling and stay text, as
/// do integers too large for i64.
fn parse_number(s: &str) -> Option<CellValue> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    match unsigned.as_bytes() {
        [first, ..] if !first.is_ascii_digit() => return None,
        [b'0', next, ..] if next.is_ascii_digit() => return None,
        [] => return None,
        _ => {}
    }

    if unsigned.bytes().all(|b| b.is_ascii_digit()) {
        let i = s.parse::<i64>().ok()?;
        return (i.to_string() == s).then_some(CellValue::Int(i));
    }

    s.parse::<f64>().ok().map(number_cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("42.0"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.25"), CellValue::Float(3.25));
        assert_eq!(parse_cell_value("NA"), CellValue::from("NA"));
        assert_eq!(parse_cell_value(" hello "), CellValue::from("hello"));
    }

    #[test]
    fn test_codes_keep_their_spelling() {
        assert_eq!(parse_cell_value("007"), CellValue::from("007"));
        assert_eq!(parse_cell_value("+7"), CellValue::from("+7"));
        assert_eq!(parse_cell_value("-0"), CellValue::from("-0"));
        assert_eq!(parse_cell_value("00.5"), CellValue::from("00.5"));
        assert_eq!(parse_cell_value("99999999999999999999"), CellValue::from("99999999999999999999"));
        assert_eq!(parse_cell_value("-7"), CellValue::Int(-7));
        assert_eq!(parse_cell_value("0.5"), CellValue::Float(0.5));
        assert_eq!(parse_cell_value("0"), CellValue::Int(0));
        assert_eq!(parse_cell_value("inf"), CellValue::from("inf"));
        assert_ne!(parse_cell_value("007"), parse_cell_value("7.0"));
    }

    #[test]
    fn test_read_dataset() {
        let data = "id,name,city\n1,Ana,Lima\n2,Luis\n";
        let ds = read_dataset(data.as_bytes(), b',', "people.csv".into()).unwrap();

        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["id", "name", "city"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[0].source_line, 2);
        assert_eq!(ds.rows[1].cells, vec![2i64.into(), "Luis".into(), CellValue::Null]);
    }

    #[test]
    fn test_read_tab_separated() {
        let data = "a\tb\nx\ty\n";
        let ds = read_dataset(data.as_bytes(), b'\t', "t.tsv".into()).unwrap();
        assert_eq!(ds.rows[0].cells, vec![CellValue::from("x"), CellValue::from("y")]);
    }

    #[test]
    fn test_header_only() {
        let ds = read_dataset("id,name\n".as_bytes(), b',', "empty.csv".into()).unwrap();
        assert!(ds.has_schema());
        assert!(ds.is_empty());
    }

    #[test]
    fn test_extra_cells_dropped() {
        let ds = read_dataset("id\n1,2,3\n".as_bytes(), b',', "wide.csv".into()).unwrap();
        assert_eq!(ds.rows[0].cells, vec![CellValue::Int(1)]);
    }
}
