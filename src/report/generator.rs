//! Text and JSON report generation.
//!
//! This module renders answered sections and the manual statistics into
//! the plain-text report format, and writes finished reports to disk.

use crate::errors::InsightError;
use crate::models::{AggregateReport, AnsweredQuestion, AnsweredSection, Report};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Title line of every text report.
pub const DEFAULT_TITLE: &str = "采购KPI分析结果汇总";

/// Report file holding every section.
pub const COMBINED_FILE_NAME: &str = "analysis_results.txt";

/// All-sections file written alongside the per-section files in split mode.
pub const ALL_SECTIONS_FILE_NAME: &str = "all_analysis_results.txt";

pub const JSON_FILE_NAME: &str = "analysis_results.json";

const RULE_WIDTH: usize = 50;

/// Render a complete text report.
pub fn generate_text_report(
    title: &str,
    sections: &[AnsweredSection],
    aggregates: &AggregateReport,
) -> String {
    let mut output = String::new();

    output.push_str(title);
    output.push('\n');
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push_str("\n\n");

    for section in sections {
        output.push_str(&generate_section(section, aggregates));
    }

    output
}

/// Render the text report files as (file name, content) pairs.
///
/// Without `split` this is a single combined file. With `split` every
/// section gets its own file, followed by one file holding all sections.
pub fn render_text_outputs(
    title: &str,
    sections: &[AnsweredSection],
    aggregates: &AggregateReport,
    split: bool,
) -> Vec<(&'static str, String)> {
    let combined = generate_text_report(title, sections, aggregates);

    if !split {
        return vec![(COMBINED_FILE_NAME, combined)];
    }

    let mut outputs: Vec<(&'static str, String)> = sections
        .iter()
        .map(|section| {
            let single = std::slice::from_ref(section);
            (
                section.kind.file_name(),
                generate_text_report(title, single, aggregates),
            )
        })
        .collect();
    outputs.push((ALL_SECTIONS_FILE_NAME, combined));

    outputs
}

/// Render one section: its header followed by each question block.
fn generate_section(section: &AnsweredSection, aggregates: &AggregateReport) -> String {
    let mut block = String::new();

    block.push_str(&format!("{}：\n", section.title));
    block.push_str(&"=".repeat(RULE_WIDTH));
    block.push_str("\n\n");

    for answered in &section.answers {
        block.push_str(&generate_question_block(answered, aggregates));
    }

    block
}

/// Render a single question block. The manual-result line appears only
/// when the question maps a metric.
fn generate_question_block(answered: &AnsweredQuestion, aggregates: &AggregateReport) -> String {
    let mut block = String::new();
    let entry = &answered.entry;

    block.push_str(&format!("问题 {}: {}\n", entry.index, entry.question));
    block.push_str(&"-".repeat(RULE_WIDTH));
    block.push('\n');
    block.push_str(&format!("AI分析结果: {}\n", answered.answer));

    if let Some(key) = entry.metric {
        block.push_str(&format!("手动计算结果: {}\n", aggregates.metric(key)));
    }

    block.push('\n');
    block
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, InsightError> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write `content` to `path`, replacing any existing file.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the destination, so `path` never holds a partial report.
pub fn write_report(content: &str, path: &Path) -> Result<(), InsightError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| InsightError::Io(e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
