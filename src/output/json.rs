//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::compare::CompareStats;
use crate::model::{ColumnSelection, Column, Row};

use super::{ComparisonReport, OutputFormatter};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable unmatched row
#[derive(Serialize)]
struct JsonRow {
    source_line: usize,
    values: Map<String, Value>,
}

impl JsonRow {
    fn new(columns: &[Column], row: &Row) -> Self {
        Self {
            source_line: row.source_line,
            values: row_object(columns, row),
        }
    }
}

/// A row as a JSON object keyed by column name, in schema order
pub(crate) fn row_object(columns: &[Column], row: &Row) -> Map<String, Value> {
    columns
        .iter()
        .map(|col| {
            let value = row
                .get(col.index)
                .and_then(|cell| serde_json::to_value(cell).ok())
                .unwrap_or(Value::Null);
            (col.name.clone(), value)
        })
        .collect()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    first_file: &'a str,
    second_file: &'a str,
    selection: &'a ColumnSelection,
    status: String,
    stats: &'a CompareStats,
    unmatched_rows: Vec<JsonRow>,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let columns = report.result.columns();
        let output = JsonReport {
            first_file: &report.first.name,
            second_file: &report.second.name,
            selection: report.selection,
            status: report.result.status_message(),
            stats: &report.result.stats,
            unmatched_rows: report
                .result
                .iter()
                .map(|row| JsonRow::new(columns, row))
                .collect(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::find_unmatched;
    use crate::output::testing::sample;

    #[test]
    fn test_json_report() {
        let (first, second) = sample();
        let selection = ColumnSelection::shared(["id"]);
        let result = find_unmatched(&first, &second, &selection).unwrap();
        let report = ComparisonReport {
            first: &first,
            second: &second,
            selection: &selection,
            result: &result,
            preview_rows: 10,
        };

        let mut out = Vec::new();
        JsonOutput::compact().render(&report, &mut out).unwrap();
        let doc: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(doc["first_file"], "clients.csv");
        assert_eq!(doc["selection"]["left"][0], "id");
        assert_eq!(doc["stats"]["rows_unmatched"], 2);
        assert_eq!(doc["status"], "Found 2 unmatched rows.");

        let rows = doc["unmatched_rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["source_line"], 2);
        assert_eq!(rows[0]["values"]["name"], "Ana");
        assert_eq!(rows[1]["values"]["id"], 3);
    }
}
