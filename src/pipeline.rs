//! Staged comparison run: load, compare, render, export

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::ColorChoice;
use tracing::{debug, info};

use crate::compare::{CompareStats, ComparisonEngine, ResultSet};
use crate::config::Config;
use crate::error::CompareError;
use crate::export::ReportExporter;
use crate::model::{ColumnSelection, Dataset};
use crate::output::{ComparisonReport, OutputFactory};
use crate::parser::ParserFactory;

/// Pipeline stage, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Compare,
    Render,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "loading input files",
            Stage::Compare => "comparing rows",
            Stage::Render => "rendering results",
            Stage::Export => "exporting report",
        };
        write!(f, "{}", name)
    }
}

/// Both input datasets, loaded and checked
#[derive(Debug)]
pub struct LoadedInputs {
    pub first: Dataset,
    pub second: Dataset,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: CompareStats,
    /// Where the report was written, if exporting was requested
    pub export_path: Option<PathBuf>,
}

impl RunOutcome {
    /// True when the first file has rows missing from the second
    pub fn has_unmatched(&self) -> bool {
        self.stats.rows_unmatched > 0
    }
}

/// Runs one comparison described by a [`Config`]
pub struct Pipeline<'c> {
    config: &'c Config,
    factory: ParserFactory,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            factory: ParserFactory::new(),
        }
    }

    /// Load both files concurrently
    pub fn load(&self) -> Result<LoadedInputs> {
        let (first, second) = rayon::join(
            || self.load_one(&self.config.first_file),
            || self.load_one(&self.config.second_file),
        );
        let inputs = LoadedInputs {
            first: first.with_context(|| Stage::Load)?,
            second: second.with_context(|| Stage::Load)?,
        };
        info!(
            first_rows = inputs.first.row_count(),
            second_rows = inputs.second.row_count(),
            "inputs loaded"
        );
        Ok(inputs)
    }

    fn load_one(&self, path: &Path) -> Result<Dataset> {
        let dataset = self
            .factory
            .parse(path, self.config)
            .with_context(|| format!("Failed to parse file: {}", path.display()))?;

        if !dataset.has_schema() {
            return Err(CompareError::InvalidInput(format!(
                "{} has no header row, so no columns can be compared",
                path.display()
            ))
            .into());
        }
        Ok(dataset)
    }

    /// Run the comparison engine, drawing a progress bar when enabled
    pub fn compare<'a>(
        &self,
        inputs: &'a LoadedInputs,
        selection: &ColumnSelection,
    ) -> Result<ResultSet<'a>> {
        let bar = progress_bar(self.config.show_progress)?;

        let result = ComparisonEngine::new()
            .with_progress(|percent| bar.set_position(u64::from(percent)))
            .compare(&inputs.first, &inputs.second, selection);
        bar.finish_and_clear();

        let result = result.with_context(|| Stage::Compare)?;
        debug!(unmatched = result.len(), "comparison stage done");
        Ok(result)
    }

    /// Write the report in the configured output format
    pub fn render(
        &self,
        report: &ComparisonReport<'_>,
        color_choice: ColorChoice,
        writer: &mut dyn Write,
    ) -> Result<()> {
        if self.config.stats_only {
            return write_stats(report, writer).with_context(|| Stage::Render);
        }

        OutputFactory::create(self.config.output_format, color_choice)
            .render(report, writer)
            .with_context(|| Stage::Render)
    }

    /// Export the report file when an export directory is configured
    pub fn export(&self, result: &ResultSet<'_>) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.config.export_dir else {
            return Ok(None);
        };
        let path = ReportExporter::new(self.config.export_format)
            .export(result, dir)
            .with_context(|| Stage::Export)?;
        Ok(Some(path))
    }

    /// Run every stage, rendering to `writer`
    pub fn run(&self, color_choice: ColorChoice, writer: &mut dyn Write) -> Result<RunOutcome> {
        let selection = self.config.selection();
        // Selection errors need no input files to be detected
        selection.validate().with_context(|| Stage::Compare)?;

        let inputs = self.load()?;
        let result = self.compare(&inputs, &selection)?;

        let report = ComparisonReport {
            first: &inputs.first,
            second: &inputs.second,
            selection: &selection,
            result: &result,
            preview_rows: self.config.preview_rows,
        };
        self.render(&report, color_choice, writer)?;

        let export_path = self.export(&result)?;

        Ok(RunOutcome {
            stats: result.stats.clone(),
            export_path,
        })
    }
}

fn progress_bar(show: bool) -> Result<ProgressBar> {
    if !show {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}%")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

fn write_stats(report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
    let stats = &report.result.stats;
    writeln!(writer, "First file:  {} ({} rows)", report.first.name, stats.first_row_count)?;
    writeln!(writer, "Second file: {} ({} rows)", report.second.name, stats.second_row_count)?;
    writeln!(writer, "Key:         {}", report.selection)?;
    writeln!(writer)?;
    writeln!(writer, "Unmatched:     {}", stats.rows_unmatched)?;
    writeln!(writer, "Matched:       {}", stats.rows_matched)?;
    writeln!(writer, "Distinct keys: {}", stats.distinct_keys)?;
    Ok(())
}
