//! Export of unmatched rows as a downloadable report file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::info;

use crate::compare::ResultSet;
use crate::config::ExportFormat;
use crate::model::CellValue;
use crate::output::{display_cells, row_object};

/// Base name of every exported report
pub const REPORT_FILE_STEM: &str = "unmatched_rows_report";

/// Worksheet holding the rows of an xlsx report
pub const REPORT_SHEET_NAME: &str = "Unmatched rows";

/// Writes a result set to a report file with a fixed name
pub struct ReportExporter {
    format: ExportFormat,
}

impl ReportExporter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// File name of the report for this exporter's format
    pub fn file_name(&self) -> String {
        format!("{}.{}", REPORT_FILE_STEM, self.format.extension())
    }

    /// Write the report into `dir`, replacing any earlier report there
    pub fn export(&self, result: &ResultSet<'_>, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());

        match self.format {
            ExportFormat::Xlsx => write_xlsx(result, &path)?,
            ExportFormat::Csv => write_text_file(&path, |w| write_csv(result, w))?,
            ExportFormat::Json => write_text_file(&path, |w| write_json(result, w))?,
        }

        info!(path = %path.display(), rows = result.len(), "exported report");
        Ok(path)
    }
}

fn write_text_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report file: {}", path.display()))
}

/// One worksheet: a bold header row, then the unmatched rows
fn write_xlsx(result: &ResultSet<'_>, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, column) in result.columns().iter().enumerate() {
        let col = u16::try_from(col).context("Too many columns for a worksheet")?;
        worksheet.write_string_with_format(0, col, column.name.as_str(), &bold)?;
    }

    for (i, row) in result.iter().enumerate() {
        let row_num = u32::try_from(i + 1).context("Too many rows for a worksheet")?;
        for (col, cell) in row.cells.iter().enumerate().take(result.columns().len()) {
            let col = u16::try_from(col).context("Too many columns for a worksheet")?;
            write_xlsx_cell(worksheet, row_num, col, cell)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write report file: {}", path.display()))
}

fn write_xlsx_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<()> {
    match cell {
        CellValue::Null => {}
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        // Strings, dates and datetimes keep their printed form
        other => {
            worksheet.write_string(row, col, other.display().into_owned())?;
        }
    }
    Ok(())
}

/// Header row plus one record per unmatched row, in schema order
fn write_csv<W: Write>(result: &ResultSet<'_>, writer: W) -> Result<()> {
    let columns = result.columns();
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(columns.iter().map(|c| c.name.as_str()))
        .context("Failed to write report header")?;
    for row in result.iter() {
        csv_writer
            .write_record(display_cells(row, columns.len()))
            .with_context(|| format!("Failed to write report row {}", row.source_line))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Array of row objects keyed by column name
fn write_json<W: Write>(result: &ResultSet<'_>, writer: W) -> Result<()> {
    let columns = result.columns();
    let rows: Vec<_> = result.iter().map(|row| row_object(columns, row)).collect();
    serde_json::to_writer_pretty(writer, &rows).context("Failed to write JSON report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::find_unmatched;
    use crate::model::ColumnSelection;
    use crate::output::testing::sample;
    use calamine::{open_workbook_auto, Data, Reader};

    #[test]
    fn test_csv_report() {
        let (first, second) = sample();
        let result = find_unmatched(&first, &second, &ColumnSelection::shared(["id"])).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = ReportExporter::new(ExportFormat::Csv)
            .export(&result, dir.path())
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "unmatched_rows_report.csv");
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "id,name\n1,Ana\n3,<Eva>\n");
    }

    #[test]
    fn test_xlsx_report() {
        let (first, second) = sample();
        let result = find_unmatched(&first, &second, &ColumnSelection::shared(["id"])).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = ReportExporter::new(ExportFormat::Xlsx)
            .export(&result, dir.path())
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "unmatched_rows_report.xlsx");
        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![REPORT_SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(REPORT_SHEET_NAME).unwrap();
        assert_eq!(range.get_size(), (3, 2));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("name".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("<Eva>".into())));
    }

    #[test]
    fn test_json_report() {
        let (first, second) = sample();
        let result = find_unmatched(&first, &second, &ColumnSelection::shared(["id"])).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = ReportExporter::new(ExportFormat::Json)
            .export(&result, dir.path())
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "unmatched_rows_report.json");
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(doc[0]["id"], 1);
        assert_eq!(doc[1]["name"], "<Eva>");
    }

    #[test]
    fn test_empty_result_writes_header_only() {
        let (first, _) = sample();
        let result = find_unmatched(&first, &first, &ColumnSelection::shared(["id"])).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = ReportExporter::new(ExportFormat::Csv)
            .export(&result, dir.path())
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "id,name\n");
    }
}
