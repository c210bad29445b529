//! JSON array parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::model::{columns_from_names, CellValue, Dataset};

use super::{number_cell, text_cell, Parser};

/// Parser for JSON array files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Dataset> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        dataset_from_value(value, path.display().to_string())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("json")
    }
}

/// Build a dataset from an array of objects (or a single object).
///
/// The schema is the union of object keys in first-seen order; keys an
/// object lacks are null in its row.
fn dataset_from_value(value: Value, name: String) -> Result<Dataset> {
    let array = match value {
        Value::Array(arr) => arr,
        Value::Object(_) => vec![value],
        _ => bail!("JSON must be an array or object"),
    };

    let mut column_names: IndexSet<String> = IndexSet::new();
    for item in &array {
        if let Value::Object(obj) = item {
            column_names.extend(obj.keys().cloned());
        }
    }

    let mut dataset = Dataset::new(name, columns_from_names(column_names.iter().cloned()));

    for (line_num, item) in array.iter().enumerate() {
        let Value::Object(obj) = item else {
            warn!(
                dataset = %dataset.name,
                index = line_num,
                "skipping array item that is not an object"
            );
            continue;
        };
        let cells = column_names
            .iter()
            .map(|key| json_value_to_cell(obj.get(key)))
            .collect();

        dataset.add_row(cells, line_num + 1);
    }

    Ok(dataset)
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                number_cell(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            text_cell(trimmed)
        }
        // Nested values are compared by their JSON text
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            CellValue::String(Cow::Owned(nested.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_union_of_keys() {
        let value = json!([
            {"id": 1, "name": "a"},
            {"id": 2, "email": "b@x"}
        ]);
        let ds = dataset_from_value(value, "rows.json".into()).unwrap();

        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["id", "name", "email"]);
        assert_eq!(
            ds.rows[1].cells,
            vec![CellValue::Int(2), CellValue::Null, CellValue::from("b@x")]
        );
    }

    #[test]
    fn test_empty_array_has_no_schema() {
        let ds = dataset_from_value(json!([]), "empty.json".into()).unwrap();
        assert!(!ds.has_schema());
        assert!(ds.is_empty());
    }

    #[test]
    fn test_strings_are_trimmed_text() {
        assert_eq!(json_value_to_cell(Some(&json!(" a "))), CellValue::from("a"));
        assert_eq!(json_value_to_cell(Some(&json!("007"))), CellValue::from("007"));
        assert_eq!(json_value_to_cell(Some(&json!(""))), CellValue::Null);
    }

    #[test]
    fn test_scalar_rejected() {
        assert!(dataset_from_value(json!(3), "n.json".into()).is_err());
    }

    #[test]
    fn test_non_object_items_skipped() {
        let ds = dataset_from_value(json!([{"id": 1}, 5, {"id": 2}]), "mixed.json".into()).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[1].source_line, 3);
    }

    #[test]
    fn test_value_types() {
        assert_eq!(json_value_to_cell(Some(&json!(1.5))), CellValue::Float(1.5));
        assert_eq!(json_value_to_cell(Some(&json!(1.0))), CellValue::Int(1));
        assert_eq!(json_value_to_cell(Some(&json!(true))), CellValue::Bool(true));
        assert_eq!(
            json_value_to_cell(Some(&json!([1, 2]))),
            CellValue::from("[1,2]")
        );
    }
}
