//! HTML report output

use std::io::Write;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tera::{Context, Tera};

use crate::compare::CompareStats;
use crate::model::{Dataset, Row};

use super::{display_cells, ComparisonReport, OutputFormatter};

/// HTML report output
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct HtmlTable {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl HtmlTable {
    fn new<'r>(title: String, dataset: &Dataset, rows: impl Iterator<Item = &'r Row>) -> Self {
        let mut headers = vec!["line".to_string()];
        headers.extend(dataset.column_names().map(str::to_string));

        let rows = rows
            .map(|row| {
                let mut cells = vec![row.source_line.to_string()];
                cells.extend(display_cells(row, dataset.column_count()));
                cells
            })
            .collect();

        Self {
            title,
            headers,
            rows,
        }
    }
}

#[derive(Serialize)]
struct HtmlPage<'a> {
    first_file: &'a str,
    second_file: &'a str,
    selection: String,
    status: String,
    stats: &'a CompareStats,
    previews: Vec<HtmlTable>,
    result: HtmlTable,
}

impl OutputFormatter for HtmlOutput {
    fn render(&self, report: &ComparisonReport<'_>, writer: &mut dyn Write) -> Result<()> {
        let previews = if report.preview_rows == 0 {
            Vec::new()
        } else {
            [report.first, report.second]
                .into_iter()
                .map(|ds| {
                    HtmlTable::new(
                        format!("Preview of {}", ds.name),
                        ds,
                        ds.head(report.preview_rows).iter(),
                    )
                })
                .collect()
        };

        let page = HtmlPage {
            first_file: &report.first.name,
            second_file: &report.second.name,
            selection: report.selection.to_string(),
            status: report.result.status_message(),
            stats: &report.result.stats,
            previews,
            result: HtmlTable::new(
                "Unmatched Rows".to_string(),
                report.result.source(),
                report.result.iter(),
            ),
        };

        let context = Context::from_serialize(&page).context("Failed to build report context")?;
        let html = Tera::one_off(TEMPLATE, &context, true).context("Failed to render HTML report")?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>rowsift: {{ first_file }} vs {{ second_file }}</title>
  <style>
    :root { --bg: #1a1b26; --fg: #a9b1d6; --accent: #7aa2f7; --green: #9ece6a; --yellow: #e0af68; --border: #414868; }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'JetBrains Mono', 'Fira Code', monospace; background: var(--bg); color: var(--fg); padding: 2rem; line-height: 1.6; }
    .header { border-bottom: 2px solid var(--border); padding-bottom: 1rem; margin-bottom: 2rem; }
    .header h1 { color: var(--accent); font-size: 2rem; font-weight: 600; }
    .status { font-size: 1.25rem; margin-bottom: 1rem; }
    .status.found { color: var(--yellow); }
    .status.none { color: var(--green); }
    .section { margin-bottom: 2rem; }
    .section h2 { color: var(--accent); font-size: 1.25rem; margin-bottom: 1rem; border-bottom: 1px solid var(--border); }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 0.5rem 0.75rem; border: 1px solid var(--border); }
    th { background: rgba(255,255,255,0.05); }
  </style>
</head>
<body>
  <div class="header">
    <h1>rowsift</h1>
    <p>Rows of {{ first_file }} missing from {{ second_file }}</p>
    <p>Key: {{ selection }}</p>
  </div>
{% for table in previews %}
  <div class="section">
    <h2>{{ table.title }}</h2>
    <table>
      <tr>{% for h in table.headers %}<th>{{ h }}</th>{% endfor %}</tr>
{% for row in table.rows %}      <tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
{% endfor %}    </table>
  </div>
{% endfor %}
  <div class="section">
    <p class="status {% if stats.rows_unmatched > 0 %}found{% else %}none{% endif %}">{{ status }}</p>
    <p>{{ stats.rows_unmatched }} unmatched, {{ stats.rows_matched }} matched out of {{ stats.first_row_count }} rows</p>
  </div>
{% if result.rows | length > 0 %}
  <div class="section">
    <h2>{{ result.title }}</h2>
    <table>
      <tr>{% for h in result.headers %}<th>{{ h }}</th>{% endfor %}</tr>
{% for row in result.rows %}      <tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
{% endfor %}    </table>
  </div>
{% endif %}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::find_unmatched;
    use crate::model::ColumnSelection;
    use crate::output::testing::sample;

    #[test]
    fn test_html_report_escapes_values() {
        let (first, second) = sample();
        let selection = ColumnSelection::shared(["id"]);
        let result = find_unmatched(&first, &second, &selection).unwrap();
        let report = ComparisonReport {
            first: &first,
            second: &second,
            selection: &selection,
            result: &result,
            preview_rows: 0,
        };

        let mut out = Vec::new();
        HtmlOutput::new().render(&report, &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Found 2 unmatched rows."));
        assert!(html.contains("&lt;Eva&gt;"));
        assert!(!html.contains("<Eva>"));
        assert!(!html.contains("Preview of"));
    }
}
