//! Output formatting utilities.

use idp_data_core::{ImportReport, SectionSummary};
use serde_json::{json, Value};

/// Formats an import report as JSON.
pub fn report_json(report: &ImportReport) -> Value {
    json!({
        "imported": report.imported,
        "skipped": report.skipped,
    })
}

/// Formats an import report for humans.
pub fn report_lines(report: &ImportReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.imported.len() + report.skipped.len() + 1);
    for name in &report.imported {
        lines.push(format!("imported  {}", name));
    }
    for name in &report.skipped {
        lines.push(format!("skipped   {}", name));
    }
    lines.push(format!(
        "{} section(s) imported, {} skipped",
        report.imported.len(),
        report.skipped.len()
    ));
    lines
}

/// Formats section summaries as JSON.
pub fn sections_json(sections: &[SectionSummary]) -> Value {
    Value::Array(
        sections
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "recognized": s.recognized,
                    "kind": s.kind.to_string(),
                })
            })
            .collect(),
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!("{:<32} {:<12} {}", "SECTION", "KIND", "STATUS");
    println!("{}", "-".repeat(60));
}

/// Formats a section summary as a table row.
pub fn format_table_row(section: &SectionSummary) -> String {
    let status = if section.recognized {
        "recognized"
    } else {
        "skipped"
    };
    format!(
        "{:<32} {:<12} {}",
        truncate(&section.name, 32),
        section.kind.to_string(),
        status
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
