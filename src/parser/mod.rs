//! Parser layer for reading tabular data files into datasets

mod csv;
mod excel;
mod json;

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Result};
use tracing::debug;

use crate::config::Config;
use crate::model::{CellValue, Dataset};

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Dataset
    fn parse(&self, path: &Path, config: &Config) -> Result<Dataset>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser), Box::new(JsonParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or_default().to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Dataset> {
        let parser = self.get_parser(path)?;
        let dataset = parser.parse(path, config)?;
        debug!(
            file = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed dataset"
        );
        Ok(dataset)
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::{BufRead, BufReader, Read};

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8];
    let bytes_read = reader.read(&mut buffer).ok()?;

    if bytes_read >= 4 {
        // Excel ZIP format (xlsx)
        if &buffer[0..4] == b"PK\x03\x04" {
            return Some("xlsx");
        }

        // Old Excel format (xls)
        if &buffer[0..4] == b"\xD0\xCF\x11\xE0" {
            return Some("xls");
        }
    }

    reader.seek_relative(-(bytes_read as i64)).ok()?;
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    Some("csv")
}

/// Text cell with surrounding whitespace removed; blank text is null
pub(crate) fn text_cell(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(Cow::Owned(trimmed.to_string()))
    }
}

/// Numeric cell; whole values become `Int` so every file format agrees on `7`
pub(crate) fn number_cell(f: f64) -> CellValue {
    // `i64::MAX as f64` is 2^63, one past the largest i64
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}
