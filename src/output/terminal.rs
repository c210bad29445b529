//! Terminal output: previews, status line and result table

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::model::{Column, Row};

use super::{display_cells, ComparisonReport, OutputFormatter};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
        }
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    fn write_header(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            writer,
            " rowsift: rows of {} missing from {}",
            report.first.name, report.second.name
        )?;
        writeln!(writer, " key: {}", report.selection)?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_previews(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        if report.preview_rows == 0 {
            return Ok(());
        }

        for dataset in [report.first, report.second] {
            let head = dataset.head(report.preview_rows);
            writeln!(
                writer,
                "Preview of {} ({} of {} rows):",
                dataset.name,
                head.len(),
                dataset.row_count()
            )?;
            writeln!(writer, "{}", build_table(&dataset.columns, head.iter()))?;
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_status(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let color = if report.result.is_empty() {
            Color::Green
        } else {
            Color::Yellow
        };

        let mut buffer = BufferWriter::stdout(self.color_choice).buffer();
        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(buffer, "{}", report.result.status_message())?;
        buffer.reset()?;
        writeln!(buffer)?;

        writer.write_all(buffer.as_slice())?;
        Ok(())
    }

    fn write_summary(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let stats = &report.result.stats;
        writeln!(
            writer,
            "Summary: {} unmatched, {} matched (out of {} rows; {} rows / {} distinct keys in {})",
            stats.rows_unmatched,
            stats.rows_matched,
            stats.first_row_count,
            stats.second_row_count,
            stats.distinct_keys,
            report.second.name
        )?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        self.write_header(report, writer)?;
        self.write_previews(report, writer)?;
        self.write_status(report, writer)?;

        if report.result.is_empty() {
            return Ok(());
        }

        writeln!(writer)?;
        self.write_summary(report, writer)?;
        writeln!(writer, "Unmatched Rows:")?;
        writeln!(
            writer,
            "{}",
            build_table(report.result.columns(), report.result.iter())
        )?;

        Ok(())
    }
}

/// Build a formatted table with a leading source-line column
fn build_table<'r>(columns: &[Column], rows: impl Iterator<Item = &'r Row>) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["line".to_string()];
    header.extend(columns.iter().map(|c| c.name.clone()));
    builder.push_record(header);

    for row in rows {
        let mut record = vec![row.source_line.to_string()];
        record.extend(display_cells(row, columns.len()));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}
