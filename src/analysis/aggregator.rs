//! Cross-document aggregation.
//!
//! Each statistical category has its own accumulator implementing
//! [`CategoryFolder`]. Categories never read each other's state, so a
//! document can be folded into them in any order. Accumulators built over
//! disjoint slices of the input combine with [`CategoryFolder::merge`],
//! provided the slices are merged in input order.

use super::graph::GraphMerger;
use crate::models::{AggregatedSummary, DocumentRecord, VoteOutcome};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A fold routine for one statistical category.
pub trait CategoryFolder: Default {
    /// Accumulate one document. A document without the category is a no-op.
    fn fold(&mut self, document: &DocumentRecord);

    /// Absorb an accumulator built over documents that follow this one.
    fn merge(&mut self, other: Self);
}

/// Add `count` to the tally of `key`, saturating at `u64::MAX`.
pub(crate) fn bump<K: Ord>(counts: &mut BTreeMap<K, u64>, key: K, count: u64) {
    let total = counts.entry(key).or_insert(0);
    *total = total.saturating_add(count);
}

/// Add every count of `from` into `into`.
pub(crate) fn add_counts<K: Ord>(into: &mut BTreeMap<K, u64>, from: BTreeMap<K, u64>) {
    for (key, count) in from {
        bump(into, key, count);
    }
}

/// Attendance tallies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attendance {
    pub all_present_count: usize,
    pub not_all_present_count: usize,
    /// Raw audit trail of absentees, duplicates kept.
    pub absent_list: Vec<String>,
}

impl CategoryFolder for Attendance {
    fn fold(&mut self, document: &DocumentRecord) {
        let Some(presence) = &document.presence_absence else {
            return;
        };
        if presence.is_empty() {
            return;
        }

        if presence.all_present {
            self.all_present_count = self.all_present_count.saturating_add(1);
        } else {
            self.not_all_present_count = self.not_all_present_count.saturating_add(1);
        }
        self.absent_list.extend(presence.absent_list.iter().cloned());
    }

    fn merge(&mut self, other: Self) {
        self.all_present_count = self.all_present_count.saturating_add(other.all_present_count);
        self.not_all_present_count = self
            .not_all_present_count
            .saturating_add(other.not_all_present_count);
        self.absent_list.extend(other.absent_list);
    }
}

/// Set of cited laws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Citations {
    pub laws: BTreeSet<String>,
}

impl CategoryFolder for Citations {
    fn fold(&mut self, document: &DocumentRecord) {
        self.laws.extend(document.law_citations().iter().cloned());
    }

    fn merge(&mut self, other: Self) {
        self.laws.extend(other.laws);
    }
}

/// Paragraph, word and speaker totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStats {
    pub total_paragraphs: u64,
    pub total_words: u64,
    pub speaker_counts: BTreeMap<String, u64>,
}

impl CategoryFolder for TextStats {
    fn fold(&mut self, document: &DocumentRecord) {
        let Some(stats) = &document.global_stats else {
            return;
        };

        self.total_paragraphs = self.total_paragraphs.saturating_add(stats.total_paragraphs);
        self.total_words = self.total_words.saturating_add(stats.total_words);
        for (speaker, count) in &stats.speakers_global_count {
            bump(&mut self.speaker_counts, speaker.clone(), *count);
        }
    }

    fn merge(&mut self, other: Self) {
        self.total_paragraphs = self.total_paragraphs.saturating_add(other.total_paragraphs);
        self.total_words = self.total_words.saturating_add(other.total_words);
        add_counts(&mut self.speaker_counts, other.speaker_counts);
    }
}

/// Decision count and role tallies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionTally {
    pub decision_count: usize,
    pub rapporteur_counts: BTreeMap<String, u64>,
    pub president_counts: BTreeMap<String, u64>,
}

impl CategoryFolder for DecisionTally {
    fn fold(&mut self, document: &DocumentRecord) {
        let decisions = document.decisions();
        self.decision_count = self.decision_count.saturating_add(decisions.len());

        for decision in decisions {
            if let Some(rapporteur) = decision.rapporteur() {
                bump(&mut self.rapporteur_counts, rapporteur.to_string(), 1);
            }
            if let Some(president) = decision.president() {
                bump(&mut self.president_counts, president.to_string(), 1);
            }
        }
    }

    fn merge(&mut self, other: Self) {
        self.decision_count = self.decision_count.saturating_add(other.decision_count);
        add_counts(&mut self.rapporteur_counts, other.rapporteur_counts);
        add_counts(&mut self.president_counts, other.president_counts);
    }
}

/// Vote count and outcome tallies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    pub vote_count: usize,
    pub result_counts: BTreeMap<VoteOutcome, u64>,
}

impl CategoryFolder for VoteTally {
    fn fold(&mut self, document: &DocumentRecord) {
        let votes = document.votes();
        self.vote_count = self.vote_count.saturating_add(votes.len());

        for vote in votes {
            bump(&mut self.result_counts, vote.outcome(), 1);
        }
    }

    fn merge(&mut self, other: Self) {
        self.vote_count = self.vote_count.saturating_add(other.vote_count);
        add_counts(&mut self.result_counts, other.result_counts);
    }
}

/// Accumulator for a whole aggregation run.
///
/// Owns one accumulator per category. Build it with [`Aggregator::fold`]
/// document by document, combine partial runs with [`Aggregator::merge`],
/// and turn it into the summary with [`Aggregator::finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregator {
    document_count: usize,
    error_count: usize,
    attendance: Attendance,
    citations: Citations,
    text: TextStats,
    decisions: DecisionTally,
    graphs: GraphMerger,
    votes: VoteTally,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents folded so far.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Fold one document into every category.
    pub fn fold(&mut self, document: &DocumentRecord) {
        self.document_count += 1;
        if let Some(ref error) = document.error {
            debug!("{} carries an extraction error: {}", document.display_name(), error);
            self.error_count += 1;
        }

        self.attendance.fold(document);
        self.citations.fold(document);
        self.text.fold(document);
        self.decisions.fold(document);
        self.graphs.fold(document);
        self.votes.fold(document);
    }

    /// Absorb an aggregator built over the documents following this one's.
    pub fn merge(&mut self, other: Aggregator) {
        self.document_count += other.document_count;
        self.error_count += other.error_count;

        self.attendance.merge(other.attendance);
        self.citations.merge(other.citations);
        self.text.merge(other.text);
        self.decisions.merge(other.decisions);
        self.graphs.merge(other.graphs);
        self.votes.merge(other.votes);
    }

    /// Produce the immutable summary.
    pub fn finish(self) -> AggregatedSummary {
        let decision_graph_count = self.graphs.graph_count();
        let timeline_point_count = self.graphs.point_count();
        let malformed_transition_keys = self.graphs.malformed_keys();
        let transition_counts = self.graphs.transitions().clone();
        let global_graph = self.graphs.into_graph();

        AggregatedSummary {
            document_count: self.document_count,
            error_count: self.error_count,
            all_present_count: self.attendance.all_present_count,
            not_all_present_count: self.attendance.not_all_present_count,
            absent_list: self.attendance.absent_list,
            law_citations: self.citations.laws.into_iter().collect(),
            total_paragraphs: self.text.total_paragraphs,
            total_words: self.text.total_words,
            speaker_counts: self.text.speaker_counts,
            decision_count: self.decisions.decision_count,
            rapporteur_counts: self.decisions.rapporteur_counts,
            president_counts: self.decisions.president_counts,
            decision_graph_count,
            timeline_point_count,
            transition_counts,
            malformed_transition_keys,
            vote_count: self.votes.vote_count,
            vote_result_counts: self.votes.result_counts,
            global_graph,
        }
    }
}

/// Aggregate a document list in input order.
pub fn aggregate(documents: &[DocumentRecord]) -> AggregatedSummary {
    let mut aggregator = Aggregator::new();
    for document in documents {
        aggregator.fold(document);
    }
    aggregator.finish()
}

/// The `n` largest counts, ties broken by key order.
pub fn top_counts<K: Ord>(counts: &BTreeMap<K, u64>, n: usize) -> Vec<(&K, u64)> {
    let mut entries: Vec<_> = counts.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    entries.truncate(n);
    entries
}
