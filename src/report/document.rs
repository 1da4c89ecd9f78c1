//! Single-document view.
//!
//! Renders every category of one document record, with per-decision
//! timelines optionally coalesced.

use super::generator::{table_cell, timeline_table, truncate_snippet};
use crate::config::ReportConfig;
use anyhow::Result;
use minutes_aggregator::analysis::coalesce;
use minutes_aggregator::models::{DecisionGraph, DocumentRecord, TimelinePoint};
use serde::Serialize;

/// Find the first document whose `file` field equals `name`.
pub fn find_document<'a>(documents: &'a [DocumentRecord], name: &str) -> Option<&'a DocumentRecord> {
    documents.iter().find(|d| d.file.as_deref() == Some(name))
}

fn decision_timeline(graph: &DecisionGraph, settings: &ReportConfig) -> Vec<TimelinePoint> {
    let timeline = graph.timeline();
    if settings.coalesce_timeline {
        coalesce(&timeline)
    } else {
        timeline
    }
}

/// Generate the Markdown view of one document.
pub fn generate_document_markdown(document: &DocumentRecord, settings: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Document: {}\n\n", document.display_name()));

    if let Some(ref error) = document.error {
        output.push_str(&format!("> **Extraction error:** {}\n\n", error));
    }

    output.push_str(&generate_presence_section(document));
    output.push_str(&generate_citations_section(document));
    output.push_str(&generate_stats_section(document));
    output.push_str(&generate_decisions_section(document));
    output.push_str(&generate_graphs_section(document, settings));
    output.push_str(&generate_votes_section(document, settings));

    output
}

fn generate_presence_section(document: &DocumentRecord) -> String {
    let mut section = String::from("## Presence / Absence\n\n");

    let Some(ref presence) = document.presence_absence else {
        section.push_str("Not extracted.\n\n");
        return section;
    };

    section.push_str(&format!(
        "- **All present:** {}\n",
        if presence.all_present { "yes" } else { "no" }
    ));
    if !presence.absent_list.is_empty() {
        section.push_str(&format!("- **Absent:** {}\n", presence.absent_list.join(", ")));
    }
    if !presence.all_present && !presence.exceptions.is_empty() {
        section.push_str(&format!("- **Exceptions:** {}\n", presence.exceptions.join(", ")));
    }
    section.push('\n');

    section
}

fn generate_citations_section(document: &DocumentRecord) -> String {
    let mut section = String::from("## Law Citations\n\n");

    let citations = document.law_citations();
    if citations.is_empty() {
        section.push_str("No law citation.\n\n");
        return section;
    }
    for citation in citations {
        section.push_str(&format!("- {}\n", citation));
    }
    section.push('\n');

    section
}

fn generate_stats_section(document: &DocumentRecord) -> String {
    let mut section = String::from("## Statistics\n\n");

    let Some(ref stats) = document.global_stats else {
        section.push_str("Not extracted.\n\n");
        return section;
    };

    section.push_str(&format!(
        "- **Paragraphs:** {}\n- **Words:** {}\n\n",
        stats.total_paragraphs, stats.total_words
    ));
    if !stats.speakers_global_count.is_empty() {
        section.push_str("| Speaker | Interventions |\n|:---|:---:|\n");
        for (speaker, count) in &stats.speakers_global_count {
            section.push_str(&format!("| {} | {} |\n", table_cell(speaker), count));
        }
        section.push('\n');
    }

    section
}

fn generate_decisions_section(document: &DocumentRecord) -> String {
    let mut section = String::from("## Decisions\n\n");

    let decisions = document.decisions();
    if decisions.is_empty() {
        section.push_str("No decision detected.\n\n");
        return section;
    }

    for (i, decision) in decisions.iter().enumerate() {
        section.push_str(&format!(
            "### Decision {} - {}\n\n",
            i + 1,
            decision.decision_id.as_deref().unwrap_or("???")
        ));
        section.push_str(&format!(
            "- **Rapporteur:** {}\n- **President:** {}\n",
            decision.rapporteur().unwrap_or("-"),
            decision.president().unwrap_or("-")
        ));
        if let Some(ref members) = decision.members_present {
            section.push_str(&format!("- **Members present:** {}\n", members.join(", ")));
        }
        section.push('\n');
    }

    section
}

fn generate_graphs_section(document: &DocumentRecord, settings: &ReportConfig) -> String {
    let mut section = String::from("## Decision Graphs\n\n");

    let graphs = document.decision_graphs();
    if graphs.is_empty() {
        section.push_str("No decision graph detected.\n\n");
        return section;
    }

    for (i, graph) in graphs.iter().enumerate() {
        let label = graph
            .decision_id
            .clone()
            .unwrap_or_else(|| format!("Q{}", i + 1));
        section.push_str(&format!("### Decision Graph {} - {}\n\n", i + 1, label));

        let speakers: Vec<_> = graph.speakers().into_iter().collect();
        section.push_str(&format!("- **Speakers:** {}\n\n", speakers.join(", ")));

        let timeline = decision_timeline(graph, settings);
        if !timeline.is_empty() {
            section.push_str(&timeline_table(&timeline, timeline.len(), settings.snippet_chars));
        }

        let (edges, malformed) = graph.transition_edges();
        if !edges.is_empty() {
            section.push_str("| From | To | Count |\n|:---|:---|:---:|\n");
            for (key, count) in &edges {
                section.push_str(&format!(
                    "| {} | {} | {} |\n",
                    table_cell(&key.from),
                    table_cell(&key.to),
                    count
                ));
            }
            section.push('\n');
        }
        if !malformed.is_empty() {
            section.push_str(&format!(
                "> Unreadable transition keys: {}\n\n",
                malformed.join(", ")
            ));
        }
    }

    section
}

fn generate_votes_section(document: &DocumentRecord, settings: &ReportConfig) -> String {
    let mut section = String::from("## Votes\n\n");

    let votes = document.votes();
    if votes.is_empty() {
        section.push_str("No vote detected.\n\n");
        return section;
    }

    for (i, vote) in votes.iter().enumerate() {
        section.push_str(&format!(
            "{}. **{}** {}\n",
            i + 1,
            vote.outcome(),
            truncate_snippet(vote.text.as_deref().unwrap_or(""), settings.snippet_chars)
        ));
    }
    section.push('\n');

    section
}

#[derive(Serialize)]
struct DecisionTimeline<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    decision_id: Option<&'a str>,
    coalesced: bool,
    points: Vec<TimelinePoint>,
}

#[derive(Serialize)]
struct DocumentView<'a> {
    document: &'a DocumentRecord,
    timelines: Vec<DecisionTimeline<'a>>,
}

/// Generate the JSON view of one document: the record itself plus the
/// normalized timeline of each decision graph.
pub fn generate_document_json(document: &DocumentRecord, settings: &ReportConfig) -> Result<String> {
    let view = DocumentView {
        document,
        timelines: document
            .decision_graphs()
            .iter()
            .map(|graph| DecisionTimeline {
                decision_id: graph.decision_id.as_deref(),
                coalesced: settings.coalesce_timeline,
                points: decision_timeline(graph, settings),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&view).map_err(Into::into)
}
