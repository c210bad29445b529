//! Configuration handling for rowsift

use std::path::PathBuf;

use crate::model::ColumnSelection;

/// Output format for comparison results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// File format of the exported report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    /// File extension used for the report
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// Default number of rows shown in input previews
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Configuration for a comparison run
#[derive(Debug, Clone)]
pub struct Config {
    /// File whose unmatched rows are reported
    pub first_file: PathBuf,
    /// File the rows are looked up in
    pub second_file: PathBuf,
    /// Columns forming the comparison key
    pub key_columns: Vec<String>,
    /// Column of the second file to compare against a single key column
    pub right_key_column: Option<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// For Excel files: which sheet to read
    pub sheet_name: Option<String>,
    /// Rows shown in each input preview (0 disables previews)
    pub preview_rows: usize,
    /// Directory to write the report into, when exporting
    pub export_dir: Option<PathBuf>,
    /// Report file format
    pub export_format: ExportFormat,
    /// Only show statistics, not the rows
    pub stats_only: bool,
    /// Draw a progress bar while scanning
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_file: PathBuf::new(),
            second_file: PathBuf::new(),
            key_columns: Vec::new(),
            right_key_column: None,
            output_format: OutputFormat::default(),
            sheet_name: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            export_dir: None,
            export_format: ExportFormat::default(),
            stats_only: false,
            show_progress: false,
        }
    }
}

impl Config {
    /// Create a new Config with file paths
    pub fn new(first_file: PathBuf, second_file: PathBuf) -> Self {
        Self {
            first_file,
            second_file,
            ..Default::default()
        }
    }

    /// Set key columns
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Compare the single key column against a differently named column
    pub fn with_right_key_column(mut self, column: String) -> Self {
        self.right_key_column = Some(column);
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Export the report into `dir`
    pub fn with_export(mut self, dir: PathBuf, format: ExportFormat) -> Self {
        self.export_dir = Some(dir);
        self.export_format = format;
        self
    }

    /// Enable stats-only mode
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }

    /// Enable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Column selection described by this configuration
    pub fn selection(&self) -> ColumnSelection {
        match &self.right_key_column {
            Some(right) => ColumnSelection::new(self.key_columns.clone(), vec![right.clone()]),
            None => ColumnSelection::shared(self.key_columns.iter().cloned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompareError;

    #[test]
    fn test_shared_selection() {
        let config = Config::default().with_key_columns(vec!["a".into(), "b".into()]);
        assert_eq!(config.selection(), ColumnSelection::shared(["a", "b"]));
    }

    #[test]
    fn test_paired_selection() {
        let config = Config::default()
            .with_key_columns(vec!["email".into()])
            .with_right_key_column("correo".into());
        assert_eq!(config.selection(), ColumnSelection::paired("email", "correo"));
    }

    #[test]
    fn test_right_key_with_many_columns_is_rejected() {
        let config = Config::default()
            .with_key_columns(vec!["a".into(), "b".into()])
            .with_right_key_column("c".into());
        assert_eq!(
            config.selection().validate(),
            Err(CompareError::AsymmetricSelection { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
