// crates/promql-compliance-output/src/html.rs
// ============================================================================
// Module: HTML Reporter
// Description: Self-contained HTML report with optional custom template.
// Purpose: Publish run results as a static page.
// Dependencies: promql-compliance-core
// ============================================================================

//! ## Overview
//! The page is produced by substituting the `{{summary}}` and `{{results}}`
//! markers of a template. A built-in template is used unless a custom one is
//! loaded. Every interpolated value is HTML-escaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use promql_compliance_core::ComparisonResult;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunReport;
use crate::report::describe_window;
use crate::report::failure_detail;

// ============================================================================
// SECTION: Template
// ============================================================================

/// Marker replaced by the summary section.
pub const SUMMARY_MARKER: &str = "{{summary}}";
/// Marker replaced by the results table.
pub const RESULTS_MARKER: &str = "{{results}}";
/// Maximum template file size in bytes.
const MAX_TEMPLATE_BYTES: u64 = 1024 * 1024;

/// Built-in page template.
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PromQL Compliance Report</title>
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }
td pre { margin: 0; white-space: pre-wrap; }
tr.success { background: #e6f4ea; }
tr.unsupported { background: #f1f3f4; }
tr.mismatch, tr.unexpected_success, tr.unexpected_failure { background: #fce8e6; }
</style>
</head>
<body>
<h1>PromQL Compliance Report</h1>
{{summary}}
{{results}}
</body>
</html>
"#;

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// HTML page reporter.
#[derive(Debug, Clone)]
pub struct HtmlReporter {
    /// Page template containing both markers.
    template: String,
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl HtmlReporter {
    /// Creates a reporter from template text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Template`] when a marker is missing.
    pub fn with_template(template: impl Into<String>) -> Result<Self, ReportError> {
        let template = template.into();
        for marker in [SUMMARY_MARKER, RESULTS_MARKER] {
            if !template.contains(marker) {
                return Err(ReportError::Template(format!("missing marker {marker}")));
            }
        }
        Ok(Self {
            template,
        })
    }

    /// Loads a template file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the file cannot be read, is too large, or
    /// lacks a marker.
    pub fn from_template_file(path: &Path) -> Result<Self, ReportError> {
        let size = fs::metadata(path)?.len();
        if size > MAX_TEMPLATE_BYTES {
            return Err(ReportError::Template("template exceeds size limit".to_string()));
        }
        let template = fs::read_to_string(path)?;
        Self::with_template(template)
    }
}

impl Reporter for HtmlReporter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError> {
        let page = fill_template(&self.template, &render_summary(report), &render_results(report));
        out.write_all(page.as_bytes())?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Substitutes markers in one pass so rendered content is never rescanned.
fn fill_template(template: &str, summary: &str, results: &str) -> String {
    let mut page = String::with_capacity(template.len() + summary.len() + results.len());
    let mut rest = template;
    loop {
        let next = [(SUMMARY_MARKER, summary), (RESULTS_MARKER, results)]
            .into_iter()
            .filter_map(|(marker, value)| rest.find(marker).map(|at| (at, marker, value)))
            .min_by_key(|(at, ..)| *at);
        let Some((at, marker, value)) = next else {
            page.push_str(rest);
            return page;
        };
        page.push_str(&rest[.. at]);
        page.push_str(value);
        rest = &rest[at + marker.len() ..];
    }
}

/// Renders the summary section.
fn render_summary(report: &RunReport<'_>) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<p class=\"summary\">{}</p>", escape_html(&report.total_line()));
    let _ = writeln!(
        html,
        "<p class=\"targets\">Reference: {} &middot; Test: {}</p>",
        escape_html(report.reference_url),
        escape_html(report.test_url)
    );
    if report.cancelled {
        html.push_str("<p class=\"cancelled\">Run cancelled before completion.</p>\n");
    }
    if !report.tweak_notes.is_empty() {
        html.push_str("<h2>Query tweaks</h2>\n<ul class=\"tweaks\">\n");
        for note in &report.tweak_notes {
            let _ = writeln!(html, "<li>{}</li>", escape_html(note));
        }
        html.push_str("</ul>\n");
    }
    html
}

/// Renders the results table.
fn render_results(report: &RunReport<'_>) -> String {
    let mut html = String::from(
        "<table class=\"results\">\n<tr><th>Query</th><th>Window</th><th>Outcome</th><th>Detail</th></tr>\n",
    );
    for result in report.selected() {
        render_row(result, &mut html);
    }
    html.push_str("</table>\n");
    html
}

/// Renders one result row.
fn render_row(result: &ComparisonResult, html: &mut String) {
    let detail = failure_detail(result).unwrap_or_default();
    let _ = writeln!(
        html,
        "<tr class=\"{outcome}\"><td><code>{query}</code></td><td>{window}</td><td>{outcome}</td><td><pre>{detail}</pre></td></tr>",
        outcome = result.outcome.as_str(),
        query = escape_html(&result.test_case.query),
        window = escape_html(&describe_window(result)),
        detail = escape_html(&detail),
    );
}

/// Escapes text for safe inclusion in HTML content and attributes.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
