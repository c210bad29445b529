//! rowsift - find the rows of one table that have no match in another

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;
use tracing_subscriber::EnvFilter;

use rowsift::config::{Config, ExportFormat, OutputFormat, DEFAULT_PREVIEW_ROWS};
use rowsift::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Html,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Html => OutputFormat::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(f: CliExportFormat) -> Self {
        match f {
            CliExportFormat::Csv => ExportFormat::Csv,
            CliExportFormat::Json => ExportFormat::Json,
            CliExportFormat::Xlsx => ExportFormat::Xlsx,
        }
    }
}

/// Find the rows of one table that have no match in another (CSV, Excel, JSON)
#[derive(Parser, Debug)]
#[command(name = "rowsift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File whose unmatched rows are reported
    first_file: PathBuf,

    /// File the rows are looked up in
    second_file: PathBuf,

    /// Column(s) forming the comparison key (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    key: Vec<String>,

    /// Column of the second file to compare against a single --key column
    #[arg(long)]
    right_key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// For Excel files: which sheet to compare
    #[arg(long)]
    sheet: Option<String>,

    /// Rows of each input to preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview: usize,

    /// Do not preview the input files
    #[arg(long, conflicts_with = "preview")]
    no_preview: bool,

    /// Write the unmatched rows to a report file in this directory
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Format of the exported report
    #[arg(long, value_enum, default_value = "csv")]
    export_format: CliExportFormat,

    /// Only show statistics, not the rows
    #[arg(long)]
    stats_only: bool,

    /// Show a progress bar while comparing
    #[arg(long)]
    progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(has_unmatched) => {
            if has_unmatched {
                ExitCode::from(1) // Unmatched rows found
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::new(cli.first_file, cli.second_file)
        .with_key_columns(cli.key)
        .with_output_format(cli.format.into())
        .with_preview_rows(if cli.no_preview { 0 } else { cli.preview })
        .with_stats_only(cli.stats_only)
        .with_progress(cli.progress);

    if let Some(right) = cli.right_key {
        config = config.with_right_key_column(right);
    }
    if let Some(sheet) = cli.sheet {
        config = config.with_sheet_name(sheet);
    }
    if let Some(dir) = cli.export {
        config = config.with_export(dir, cli.export_format.into());
    }

    let stdout = std::io::stdout();
    let color_choice = if stdout.is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };

    let outcome = Pipeline::new(&config).run(color_choice, &mut stdout.lock())?;

    if let Some(path) = &outcome.export_path {
        eprintln!("Report written to {}", path.display());
    }

    Ok(outcome.has_unmatched())
}
