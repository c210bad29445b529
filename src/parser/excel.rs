//! Excel file parser (xlsx, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveTime;
use tracing::debug;

use crate::config::Config;
use crate::model::{CellValue, Column, Dataset};

use super::{number_cell, text_cell, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = match config.sheet_name {
            Some(ref name) => name.clone(),
            None => {
                // Use first sheet
                let sheets = workbook.sheet_names();
                match sheets.first() {
                    Some(first) => first.clone(),
                    None => bail!("No sheets found in workbook"),
                }
            }
        };
        debug!(file = %path.display(), sheet = %sheet_name, "reading worksheet");

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        Ok(parse_range(&range, path.display().to_string()))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm" | "xlsb")
    }
}

/// Convert a worksheet range into a dataset; the first row is the header.
///
/// An empty sheet yields a dataset with no columns.
fn parse_range(range: &Range<Data>, name: String) -> Dataset {
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Dataset::new(name, Vec::new());
    };
    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name }, i)
        })
        .collect();

    let mut dataset = Dataset::new(name, columns);
    let width = dataset.column_count();

    for (line_num, row) in rows.enumerate() {
        // Sheets often carry fully blank trailing rows
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let mut cells: Vec<CellValue> = row.iter().take(width).map(convert_cell).collect();
        cells.resize(width, CellValue::Null);

        dataset.add_row(cells, line_num + 2); // +2 for 1-indexing and header
    }

    dataset
}

fn cell_to_string(cell: &Data) -> String {
    convert_cell(cell).display().into_owned()
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => text_cell(s),
        // Spreadsheets store every number as a float; whole ones become Int
        Data::Float(f) => number_cell(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => {
                if NaiveTime::from_hms_opt(0, 0, 0) == Some(datetime.time()) {
                    CellValue::Date(datetime.date())
                } else {
                    CellValue::DateTime(datetime)
                }
            }
            // Durations have no calendar date
            _ => number_cell(dt.as_f64()),
        },
        Data::DateTimeIso(s) => {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                CellValue::DateTime(dt)
            } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                text_cell(s)
            }
        }
        Data::DurationIso(s) => text_cell(s),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_whole_floats_become_ints() {
        assert_eq!(convert_cell(&Data::Float(7.0)), CellValue::Int(7));
        assert_eq!(convert_cell(&Data::Float(7.5)), CellValue::Float(7.5));
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Null);
        assert_eq!(convert_cell(&Data::String(" a ".into())), CellValue::from("a"));
        assert_eq!(
            convert_cell(&Data::Float(9_223_372_036_854_775_808.0)),
            CellValue::Float(9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn test_excel_dates() {
        let date = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            convert_cell(&date),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );

        let noon = Data::DateTime(ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            convert_cell(&noon),
            CellValue::DateTime(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_parse_range() {
        let range = sheet(vec![
            vec![Data::String("id".into()), Data::Empty],
            vec![Data::Float(1.0), Data::String("a".into())],
            vec![Data::Empty, Data::Empty],
            vec![Data::Float(2.0), Data::Empty],
        ]);
        let ds = parse_range(&range, "book.xlsx".into());

        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["id", "Column2"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[0].cells, vec![CellValue::Int(1), CellValue::from("a")]);
        assert_eq!(ds.rows[1].source_line, 4);
        assert_eq!(ds.rows[1].cells[1], CellValue::Null);
    }
}
