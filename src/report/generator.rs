//! Summary report generation.
//!
//! This module renders an [`AggregatedSummary`] as Markdown or JSON.

use crate::config::ReportConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use minutes_aggregator::analysis::{coalesce, top_counts};
use minutes_aggregator::models::{AggregatedSummary, TimelinePoint};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Metadata about one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Input files, in aggregation order.
    pub inputs: Vec<String>,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Duration of loading and aggregation in seconds.
    pub duration_seconds: f64,
}

/// The complete aggregation report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: AggregatedSummary,
    /// Global timeline with consecutive same-speaker turns merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coalesced_timeline: Option<Vec<TimelinePoint>>,
    #[serde(skip)]
    pub settings: ReportConfig,
}

impl Report {
    pub fn new(metadata: ReportMetadata, summary: AggregatedSummary, settings: ReportConfig) -> Self {
        let coalesced_timeline = settings
            .coalesce_timeline
            .then(|| coalesce(&summary.global_graph.timeline_points));

        Self {
            metadata,
            summary,
            coalesced_timeline,
            settings,
        }
    }

    /// Timeline shown in the report: coalesced when requested, raw otherwise.
    pub fn timeline(&self) -> &[TimelinePoint] {
        self.coalesced_timeline
            .as_deref()
            .unwrap_or(self.summary.global_graph.timeline_points.as_slice())
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();
    let summary = &report.summary;
    let limit = report.settings.excerpt_limit;

    output.push_str("# Minutes Aggregation Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata, summary));

    if summary.is_empty() {
        output.push_str("## No Data\n\n");
        output.push_str("No document could be loaded from the inputs. Check that each file exists and holds a JSON list of document analyses.\n\n");
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_overview_section(summary));
    output.push_str(&generate_attendance_section(summary, limit));
    output.push_str(&generate_citations_section(summary, limit));
    output.push_str(&generate_text_section(summary, limit));
    output.push_str(&generate_roles_section(summary, limit));
    output.push_str(&generate_transitions_section(summary, limit));
    output.push_str(&generate_votes_section(summary));

    if report.settings.include_timeline {
        output.push_str(&generate_timeline_section(report));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, summary: &AggregatedSummary) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Inputs:** {}\n", metadata.inputs.join(", ")));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Documents:** {}\n", summary.document_count));
    if summary.error_count > 0 {
        section.push_str(&format!(
            "- **Documents with extraction errors:** {}\n",
            summary.error_count
        ));
    }
    section.push_str(&format!(
        "- **Aggregation Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the totals table.
fn generate_overview_section(summary: &AggregatedSummary) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Documents | Decisions | Decision Graphs | Timeline Points | Votes |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.document_count,
        summary.decision_count,
        summary.decision_graph_count,
        summary.timeline_point_count,
        summary.vote_count
    ));

    section
}

fn generate_attendance_section(summary: &AggregatedSummary, limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Attendance\n\n");
    section.push_str(&format!(
        "- **All members present:** {}\n",
        summary.all_present_count
    ));
    section.push_str(&format!(
        "- **Members absent:** {}\n",
        summary.not_all_present_count
    ));

    if !summary.absent_list.is_empty() {
        section.push_str(&format!(
            "- **Absences recorded:** {}\n\n",
            summary.absent_list.len()
        ));
        for absentee in summary.absent_list.iter().take(limit) {
            section.push_str(&format!("  - {}\n", absentee));
        }
        section.push_str(&more_line(summary.absent_list.len(), limit));
    }
    section.push('\n');

    section
}

fn generate_citations_section(summary: &AggregatedSummary, limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Law Citations\n\n");
    if summary.law_citations.is_empty() {
        section.push_str("No law citation found.\n\n");
        return section;
    }

    section.push_str(&format!(
        "{} distinct citations.\n\n",
        summary.law_citations.len()
    ));
    for citation in summary.law_citations.iter().take(limit) {
        section.push_str(&format!("- {}\n", citation));
    }
    section.push_str(&more_line(summary.law_citations.len(), limit));
    section.push('\n');

    section
}

fn generate_text_section(summary: &AggregatedSummary, limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Text Statistics\n\n");
    section.push_str(&format!(
        "- **Paragraphs:** {}\n- **Words:** {}\n\n",
        summary.total_paragraphs, summary.total_words
    ));

    if !summary.speaker_counts.is_empty() {
        section.push_str("### Most Active Speakers\n\n");
        section.push_str(&count_table("Speaker", "Interventions", &summary.speaker_counts, limit));
    }

    section
}

fn generate_roles_section(summary: &AggregatedSummary, limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Decision Roles\n\n");
    if summary.rapporteur_counts.is_empty() && summary.president_counts.is_empty() {
        section.push_str("No rapporteur or president recorded.\n\n");
        return section;
    }

    if !summary.rapporteur_counts.is_empty() {
        section.push_str("### Rapporteurs\n\n");
        section.push_str(&count_table("Rapporteur", "Decisions", &summary.rapporteur_counts, limit));
    }
    if !summary.president_counts.is_empty() {
        section.push_str("### Presidents\n\n");
        section.push_str(&count_table("President", "Decisions", &summary.president_counts, limit));
    }

    section
}

fn generate_transitions_section(summary: &AggregatedSummary, limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Speaker Transitions\n\n");
    section.push_str(&format!(
        "{} speakers, {} distinct transitions.\n\n",
        summary.global_graph.all_speakers.len(),
        summary.transition_counts.len()
    ));
    if summary.malformed_transition_keys > 0 {
        section.push_str(&format!(
            "> {} transition keys could not be read and were skipped.\n\n",
            summary.malformed_transition_keys
        ));
    }

    if !summary.transition_counts.is_empty() {
        section.push_str("| From | To | Count |\n");
        section.push_str("|:---|:---|:---:|\n");
        for (key, count) in top_counts(&summary.transition_counts, limit) {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                table_cell(&key.from),
                table_cell(&key.to),
                count
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_votes_section(summary: &AggregatedSummary) -> String {
    let mut section = String::new();

    section.push_str("## Votes\n\n");
    if summary.vote_count == 0 {
        section.push_str("No vote detected.\n\n");
        return section;
    }

    section.push_str(&count_table(
        "Result",
        "Votes",
        &summary.vote_result_counts,
        summary.vote_result_counts.len(),
    ));

    section
}

/// Generate the global timeline table.
fn generate_timeline_section(report: &Report) -> String {
    let mut section = String::new();
    let timeline = report.timeline();
    let limit = report.settings.excerpt_limit;

    section.push_str("## Global Timeline\n\n");
    if timeline.is_empty() {
        section.push_str("No timeline point recorded.\n\n");
        return section;
    }

    if report.coalesced_timeline.is_some() {
        section.push_str(&format!(
            "{} speaking segments ({} turns merged by speaker).\n\n",
            timeline.len(),
            report.summary.timeline_point_count
        ));
    }

    section.push_str(&timeline_table(timeline, limit, report.settings.snippet_chars));

    section
}

/// Render timeline points as a Markdown table.
pub(crate) fn timeline_table(points: &[TimelinePoint], limit: usize, snippet_chars: usize) -> String {
    let mut table = String::new();

    table.push_str("| # | Speaker | Words | Vote | Snippet |\n");
    table.push_str("|:---:|:---|:---:|:---:|:---|\n");
    for point in points.iter().take(limit) {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            point.index,
            table_cell(&point.speaker),
            point.wordcount,
            if point.has_vote { "yes" } else { "" },
            table_cell(&truncate_snippet(&point.snippet, snippet_chars))
        ));
    }
    table.push_str(&more_line(points.len(), limit));
    table.push('\n');

    table
}

/// Two-column table of the largest counts.
fn count_table<K: Ord + Display>(
    label: &str,
    unit: &str,
    counts: &BTreeMap<K, u64>,
    limit: usize,
) -> String {
    let mut table = String::new();

    table.push_str(&format!("| {} | {} |\n", label, unit));
    table.push_str("|:---|:---:|\n");
    for (key, count) in top_counts(counts, limit) {
        table.push_str(&format!("| {} | {} |\n", table_cell(&key.to_string()), count));
    }
    table.push_str(&more_line(counts.len(), limit));
    table.push('\n');

    table
}

fn more_line(total: usize, shown: usize) -> String {
    if total > shown {
        format!("\n*... and {} more*\n", total - shown)
    } else {
        String::new()
    }
}

/// Escape a value for use inside a Markdown table cell.
pub(crate) fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Cut a snippet to `max_chars` characters.
pub(crate) fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by minutes-aggregator v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minutes_aggregator::aggregate;
    use minutes_aggregator::loader::parse_documents;

    const SAMPLE: &str = include_str!("../../fixtures/sample_minutes.json");

    fn create_test_report(settings: ReportConfig) -> Report {
        let documents = parse_documents(SAMPLE).unwrap();
        let metadata = ReportMetadata {
            inputs: vec!["sample_minutes.json".to_string()],
            generated_at: Utc::now(),
            duration_seconds: 0.1,
        };

        Report::new(metadata, aggregate(&documents), settings)
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(ReportConfig::default());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Minutes Aggregation Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Overview"));
        assert!(markdown.contains("## Attendance"));
        assert!(markdown.contains("## Law Citations"));
        assert!(markdown.contains("### Rapporteurs"));
        assert!(markdown.contains("## Speaker Transitions"));
        assert!(markdown.contains("## Votes"));
        assert!(markdown.contains("## Global Timeline"));
        assert!(markdown.contains("#PALEWSKI"));
        assert!(markdown.contains("| adopted | 2 |"));
    }

    #[test]
    fn test_empty_summary_renders_no_data() {
        let metadata = ReportMetadata {
            inputs: vec!["missing.json".to_string()],
            generated_at: Utc::now(),
            duration_seconds: 0.0,
        };
        let report = Report::new(metadata, aggregate(&[]), ReportConfig::default());

        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("## No Data"));
        assert!(!markdown.contains("## Votes"));
    }

    #[test]
    fn test_timeline_can_be_left_out() {
        let settings = ReportConfig {
            include_timeline: false,
            ..ReportConfig::default()
        };
        let markdown = generate_markdown_report(&create_test_report(settings));

        assert!(!markdown.contains("## Global Timeline"));
    }

    #[test]
    fn test_coalesced_timeline() {
        let settings = ReportConfig {
            coalesce_timeline: true,
            ..ReportConfig::default()
        };
        let report = create_test_report(settings);

        let coalesced = report.coalesced_timeline.as_ref().unwrap();
        assert!(coalesced.len() < report.summary.global_graph.timeline_points.len());
        assert_eq!(report.timeline().len(), coalesced.len());

        let raw_words: u64 = report
            .summary
            .global_graph
            .timeline_points
            .iter()
            .map(|p| p.wordcount)
            .sum();
        let merged_words: u64 = coalesced.iter().map(|p| p.wordcount).sum();
        assert_eq!(raw_words, merged_words);

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("speaking segments"));
    }

    #[test]
    fn test_excerpt_limit() {
        let settings = ReportConfig {
            excerpt_limit: 1,
            ..ReportConfig::default()
        };
        let markdown = generate_markdown_report(&create_test_report(settings));

        assert!(markdown.contains("*... and"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(ReportConfig::default());
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["document_count"], 3);
        assert_eq!(value["summary"]["vote_result_counts"]["unknown"], 1);
        assert!(value["summary"]["transition_counts"]["(#PALEWSKI,#VEDEL)"].is_number());
        assert!(value.get("coalesced_timeline").is_none());
        assert!(value.get("settings").is_none());
    }

    #[test]
    fn test_table_cell_and_truncate() {
        assert_eq!(table_cell("a|b\nc"), "a\\|b c");
        assert_eq!(truncate_snippet("Monsieur le Président", 8), "Monsieur...");
        assert_eq!(truncate_snippet("court", 80), "court");
    }
}
