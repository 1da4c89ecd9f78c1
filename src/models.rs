//! Data models for the minutes aggregator.
//!
//! Input types mirror the records emitted by the upstream extraction step,
//! one per meeting-minutes document. Every category is optional: a missing
//! field means the category was not extracted for that document. Output
//! types describe the aggregated summary handed to the report layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Speaker recorded for a timeline point that carries no speaker.
pub const UNKNOWN_SPEAKER: &str = "#unknown";

/// Label recorded for a vote whose analysis has no result.
pub const UNKNOWN_VOTE_LABEL: &str = "unknown";

/// Read an explicit `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Analysis record for a single source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Name of the source file the record was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Error reported by the extraction step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Attendance of the meeting.
    #[serde(
        default,
        alias = "presenceAbsence",
        skip_serializing_if = "Option::is_none"
    )]
    pub presence_absence: Option<PresenceAbsence>,
    /// Legal references cited in the document.
    #[serde(
        default,
        alias = "law_citations",
        alias = "lawCitations",
        skip_serializing_if = "Option::is_none"
    )]
    pub advanced_law_citations: Option<Vec<String>>,
    /// Paragraph, word and speaker statistics.
    #[serde(
        default,
        alias = "globalStats",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_stats: Option<GlobalStats>,
    /// Formal decisions taken during the meeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<Decision>>,
    /// Speaker-transition graphs, one per decision.
    #[serde(
        default,
        alias = "decisionGraphs",
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_graphs: Option<Vec<DecisionGraph>>,
    /// Votes held during the meeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<Vote>>,
}

impl DocumentRecord {
    /// Cited laws, empty when the category is absent.
    pub fn law_citations(&self) -> &[String] {
        self.advanced_law_citations.as_deref().unwrap_or_default()
    }

    /// Decisions, empty when the category is absent.
    pub fn decisions(&self) -> &[Decision] {
        self.decisions.as_deref().unwrap_or_default()
    }

    /// Decision graphs, empty when the category is absent.
    pub fn decision_graphs(&self) -> &[DecisionGraph] {
        self.decision_graphs.as_deref().unwrap_or_default()
    }

    /// Votes, empty when the category is absent.
    pub fn votes(&self) -> &[Vote] {
        self.votes.as_deref().unwrap_or_default()
    }

    /// Display name for the document.
    pub fn display_name(&self) -> &str {
        self.file.as_deref().unwrap_or("(unnamed document)")
    }
}

/// Attendance of a meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceAbsence {
    /// Whether every expected member attended.
    #[serde(default, alias = "allPresent", deserialize_with = "null_as_default")]
    pub all_present: bool,
    /// Names or identifiers of the absentees.
    #[serde(default, alias = "absentList", deserialize_with = "null_as_default")]
    pub absent_list: Vec<String>,
    /// Free-form exceptions noted next to the attendance line.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub exceptions: Vec<String>,
}

impl PresenceAbsence {
    /// True when the record carries no attendance information at all.
    pub fn is_empty(&self) -> bool {
        !self.all_present && self.absent_list.is_empty() && self.exceptions.is_empty()
    }
}

/// Text statistics for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default, alias = "totalParagraphs", deserialize_with = "null_as_default")]
    pub total_paragraphs: u64,
    #[serde(default, alias = "totalWords", deserialize_with = "null_as_default")]
    pub total_words: u64,
    /// Number of interventions per speaker.
    #[serde(
        default,
        alias = "speakerCounts",
        alias = "speaker_counts",
        deserialize_with = "null_as_default"
    )]
    pub speakers_global_count: BTreeMap<String, u64>,
}

/// A formal decision. Only the roles are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default, alias = "decisionId", skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rapporteur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub president: Option<String>,
    #[serde(
        default,
        alias = "membersPresent",
        skip_serializing_if = "Option::is_none"
    )]
    pub members_present: Option<Vec<String>>,
}

impl Decision {
    /// Rapporteur, ignoring blank values.
    pub fn rapporteur(&self) -> Option<&str> {
        non_blank(self.rapporteur.as_deref())
    }

    /// President, ignoring blank values.
    pub fn president(&self) -> Option<&str> {
        non_blank(self.president.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A speaking turn as emitted upstream, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wordcount: Option<u64>,
    #[serde(default, alias = "snippet", skip_serializing_if = "Option::is_none")]
    pub paragraph_snippet: Option<String>,
    #[serde(default, alias = "hasVote", skip_serializing_if = "Option::is_none")]
    pub has_vote: Option<bool>,
}

impl TimelineEntry {
    /// Normalize into a [`TimelinePoint`] placed at `index`.
    pub fn to_point(&self, index: usize) -> TimelinePoint {
        TimelinePoint {
            index,
            speaker: self
                .speaker
                .clone()
                .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
            wordcount: self.wordcount.unwrap_or(0),
            snippet: self.paragraph_snippet.clone().unwrap_or_default(),
            has_vote: self.has_vote.unwrap_or(false),
        }
    }

    /// Speaker of the turn, falling back to [`UNKNOWN_SPEAKER`].
    pub fn speaker(&self) -> &str {
        self.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER)
    }
}

/// A normalized speaking turn with its position in a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub index: usize,
    pub speaker: String,
    pub wordcount: u64,
    pub snippet: String,
    #[serde(default)]
    pub has_vote: bool,
}

/// Speaker graph for one decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionGraph {
    #[serde(default, alias = "decisionId", skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
    #[serde(default, alias = "timelinePoints", deserialize_with = "null_as_default")]
    pub timeline_points: Vec<TimelineEntry>,
    /// Turn-taking counts keyed by a composite `"(A,B)"` string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitions: BTreeMap<String, u64>,
    #[serde(default, alias = "allSpeakers", skip_serializing_if = "Option::is_none")]
    pub all_speakers: Option<Vec<String>>,
}

impl DecisionGraph {
    /// Normalized timeline. Points keep an explicit upstream index and
    /// otherwise take their position.
    pub fn timeline(&self) -> Vec<TimelinePoint> {
        self.timeline_points
            .iter()
            .enumerate()
            .map(|(position, entry)| entry.to_point(entry.index.unwrap_or(position)))
            .collect()
    }

    /// Speakers of the graph: the declared list, or the union of point speakers.
    pub fn speakers(&self) -> BTreeSet<String> {
        match &self.all_speakers {
            Some(declared) => declared.iter().cloned().collect(),
            None => self
                .timeline_points
                .iter()
                .map(|p| p.speaker().to_string())
                .collect(),
        }
    }

    /// Decoded transitions. Keys that do not hold exactly two speakers are
    /// returned in the second list.
    pub fn transition_edges(&self) -> (Vec<(TransitionKey, u64)>, Vec<&str>) {
        let mut edges = Vec::new();
        let mut malformed = Vec::new();

        for (raw, weight) in &self.transitions {
            match TransitionKey::parse(raw) {
                Some(key) => edges.push((key, *weight)),
                None => malformed.push(raw.as_str()),
            }
        }

        (edges, malformed)
    }
}

/// Ordered speaker pair `from -> to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionKey {
    pub from: String,
    pub to: String,
}

impl TransitionKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Decode a composite key such as `"(A,B)"` or `"('A', 'B')"`.
    ///
    /// Returns `None` unless the key splits into exactly two non-empty speakers.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);

        let mut parts = inner.split(',');
        let from = clean_speaker(parts.next()?)?;
        let to = clean_speaker(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self { from, to })
    }
}

fn clean_speaker(part: &str) -> Option<String> {
    let cleaned = part.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.from, self.to)
    }
}

impl Serialize for TransitionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A vote held during the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<VoteAnalysis>,
}

/// Upstream interpretation of a vote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Vote {
    /// Outcome of the vote, [`VoteOutcome::Unknown`] when not analysed.
    pub fn outcome(&self) -> VoteOutcome {
        VoteOutcome::from_label(self.analysis.as_ref().and_then(|a| a.result.as_deref()))
    }
}

/// Outcome of a vote.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoteOutcome {
    Adopted,
    Rejected,
    /// No result was extracted.
    Unknown,
    /// A result label outside the recognized set, kept verbatim.
    Other(String),
}

impl VoteOutcome {
    /// Classify an upstream result label. English and French spellings are
    /// recognized case-insensitively.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(raw) = label.map(str::trim) else {
            return VoteOutcome::Unknown;
        };

        match raw.to_lowercase().as_str() {
            "" | "unknown" | "inconnu" => VoteOutcome::Unknown,
            "adopted" | "adopté" | "adoptée" | "adopte" | "adoptee" => VoteOutcome::Adopted,
            "rejected" | "rejeté" | "rejetée" | "rejete" | "rejetee" => VoteOutcome::Rejected,
            _ => VoteOutcome::Other(raw.to_string()),
        }
    }

    /// Label used in summaries and reports.
    pub fn label(&self) -> &str {
        match self {
            VoteOutcome::Adopted => "adopted",
            VoteOutcome::Rejected => "rejected",
            VoteOutcome::Unknown => UNKNOWN_VOTE_LABEL,
            VoteOutcome::Other(label) => label,
        }
    }
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for VoteOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One graph spanning every decision of every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalDecisionGraph {
    /// Timeline points, `timeline_points[i].index == i`.
    pub timeline_points: Vec<TimelinePoint>,
    /// Summed transition weights.
    pub transitions: BTreeMap<TransitionKey, u64>,
    /// Sorted, deduplicated speakers.
    pub all_speakers: Vec<String>,
}

/// Cross-document statistics produced by one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSummary {
    pub document_count: usize,
    /// Documents carrying an upstream extraction error.
    pub error_count: usize,

    pub all_present_count: usize,
    pub not_all_present_count: usize,
    /// Every absentee in input order, duplicates kept.
    pub absent_list: Vec<String>,

    /// Sorted, deduplicated law citations.
    pub law_citations: Vec<String>,

    pub total_paragraphs: u64,
    pub total_words: u64,
    pub speaker_counts: BTreeMap<String, u64>,

    pub decision_count: usize,
    pub rapporteur_counts: BTreeMap<String, u64>,
    pub president_counts: BTreeMap<String, u64>,

    pub decision_graph_count: usize,
    pub timeline_point_count: usize,
    pub transition_counts: BTreeMap<TransitionKey, u64>,
    /// Transition keys skipped because they did not decode into a pair.
    pub malformed_transition_keys: usize,

    pub vote_count: usize,
    pub vote_result_counts: BTreeMap<VoteOutcome, u64>,

    pub global_graph: GlobalDecisionGraph,
}

impl AggregatedSummary {
    /// Whether the aggregation saw no document at all.
    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transition_key() {
        assert_eq!(TransitionKey::parse("(A,B)"), Some(TransitionKey::new("A", "B")));
        assert_eq!(
            TransitionKey::parse("('#VEDEL', '#noel_leon')"),
            Some(TransitionKey::new("#VEDEL", "#noel_leon"))
        );
        assert_eq!(TransitionKey::parse(" B , A "), Some(TransitionKey::new("B", "A")));
    }

    #[test]
    fn test_parse_transition_key_malformed() {
        assert_eq!(TransitionKey::parse("(A)"), None);
        assert_eq!(TransitionKey::parse("(A,B,C)"), None);
        assert_eq!(TransitionKey::parse("(,B)"), None);
        assert_eq!(TransitionKey::parse(""), None);
    }

    #[test]
    fn test_transition_key_is_ordered() {
        assert_ne!(TransitionKey::new("A", "B"), TransitionKey::new("B", "A"));
        assert_eq!(TransitionKey::new("A", "B").to_string(), "(A,B)");
    }

    #[test]
    fn test_vote_outcome_from_label() {
        assert_eq!(VoteOutcome::from_label(Some("adopted")), VoteOutcome::Adopted);
        assert_eq!(VoteOutcome::from_label(Some("Adoptée")), VoteOutcome::Adopted);
        assert_eq!(VoteOutcome::from_label(Some("REJETÉ")), VoteOutcome::Rejected);
        assert_eq!(VoteOutcome::from_label(None), VoteOutcome::Unknown);
        assert_eq!(VoteOutcome::from_label(Some("  ")), VoteOutcome::Unknown);
        assert_eq!(VoteOutcome::from_label(Some("inconnu")), VoteOutcome::Unknown);
        assert_eq!(
            VoteOutcome::from_label(Some("ajourné")),
            VoteOutcome::Other("ajourné".to_string())
        );
    }

    #[test]
    fn test_vote_outcome_labels() {
        assert_eq!(VoteOutcome::Unknown.label(), UNKNOWN_VOTE_LABEL);
        assert_eq!(VoteOutcome::Other("ajourné".to_string()).label(), "ajourné");
        assert_ne!(UNKNOWN_VOTE_LABEL, UNKNOWN_SPEAKER);
    }

    #[test]
    fn test_vote_without_analysis_is_unknown() {
        let vote: Vote = serde_json::from_str(r#"{"analysis": {}}"#).unwrap();
        assert_eq!(vote.outcome(), VoteOutcome::Unknown);

        let vote: Vote = serde_json::from_str(r#"{"text": "Vote sur le budget"}"#).unwrap();
        assert_eq!(vote.outcome(), VoteOutcome::Unknown);
    }

    #[test]
    fn test_timeline_entry_defaults() {
        let entry = TimelineEntry::default();
        let point = entry.to_point(7);

        assert_eq!(point.index, 7);
        assert_eq!(point.speaker, UNKNOWN_SPEAKER);
        assert_eq!(point.wordcount, 0);
        assert_eq!(point.snippet, "");
        assert!(!point.has_vote);
    }

    #[test]
    fn test_document_record_accepts_both_spellings() {
        let snake: DocumentRecord = serde_json::from_str(
            r#"{"presence_absence": {"all_present": true}, "advanced_law_citations": ["L1"]}"#,
        )
        .unwrap();
        let camel: DocumentRecord = serde_json::from_str(
            r#"{"presenceAbsence": {"allPresent": true}, "lawCitations": ["L1"]}"#,
        )
        .unwrap();

        assert_eq!(snake, camel);
        assert_eq!(snake.law_citations(), ["L1".to_string()]);
        assert!(snake.decisions().is_empty());
    }

    #[test]
    fn test_decision_graph_speakers_and_edges() {
        let graph: DecisionGraph = serde_json::from_str(
            r#"{
                "timeline_points": [{"speaker": "A"}, {"wordcount": 4}, {"speaker": "B"}],
                "transitions": {"(A,B)": 2, "broken": 1}
            }"#,
        )
        .unwrap();

        let speakers: Vec<_> = graph.speakers().into_iter().collect();
        assert_eq!(speakers, vec![UNKNOWN_SPEAKER, "A", "B"]);

        let (edges, malformed) = graph.transition_edges();
        assert_eq!(edges, vec![(TransitionKey::new("A", "B"), 2)]);
        assert_eq!(malformed, vec!["broken"]);

        let timeline = graph.timeline();
        assert_eq!(timeline[1].index, 1);
        assert_eq!(timeline[1].wordcount, 4);
    }

    #[test]
    fn test_blank_roles_are_ignored() {
        let decision = Decision {
            rapporteur: Some("  ".to_string()),
            president: Some("#noel_leon".to_string()),
            ..Decision::default()
        };

        assert_eq!(decision.rapporteur(), None);
        assert_eq!(decision.president(), Some("#noel_leon"));
    }
}
