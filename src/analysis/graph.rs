//! Merging of per-decision speaker graphs into one global graph.

use super::aggregator::{add_counts, bump, CategoryFolder};
use crate::models::{
    DecisionGraph, DocumentRecord, GlobalDecisionGraph, TimelinePoint, TransitionKey,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Accumulator for the decision-graph category.
///
/// Every timeline point receives the next global index in the order
/// documents → graphs → points. Indices are never reassigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphMerger {
    next_index: usize,
    graph_count: usize,
    points: Vec<TimelinePoint>,
    speakers: BTreeSet<String>,
    transitions: BTreeMap<TransitionKey, u64>,
    malformed_keys: usize,
}

impl GraphMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph_count(&self) -> usize {
        self.graph_count
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn malformed_keys(&self) -> usize {
        self.malformed_keys
    }

    /// Summed transition weights seen so far.
    pub fn transitions(&self) -> &BTreeMap<TransitionKey, u64> {
        &self.transitions
    }

    /// Append one decision graph.
    pub fn add_graph(&mut self, graph: &DecisionGraph) {
        self.graph_count += 1;

        for entry in &graph.timeline_points {
            let point = entry.to_point(self.next_index);
            self.speakers.insert(point.speaker.clone());
            self.points.push(point);
            self.next_index += 1;
        }

        let (edges, malformed) = graph.transition_edges();
        for raw in &malformed {
            debug!(
                "Skipping malformed transition key {:?} in decision {}",
                raw,
                graph.decision_id.as_deref().unwrap_or("?")
            );
        }
        self.malformed_keys += malformed.len();

        for (key, weight) in edges {
            bump(&mut self.transitions, key, weight);
        }
    }

    /// Consume the merger into the global graph.
    pub fn into_graph(self) -> GlobalDecisionGraph {
        GlobalDecisionGraph {
            timeline_points: self.points,
            transitions: self.transitions,
            all_speakers: self.speakers.into_iter().collect(),
        }
    }
}

impl CategoryFolder for GraphMerger {
    fn fold(&mut self, document: &DocumentRecord) {
        for graph in document.decision_graphs() {
            self.add_graph(graph);
        }
    }

    /// Append `other` after `self`. Points of `other` are shifted by the
    /// number of points already held, which is the index each would have
    /// received in a single sequential fold.
    fn merge(&mut self, other: Self) {
        let offset = self.next_index;

        self.points.extend(other.points.into_iter().map(|mut point| {
            point.index += offset;
            point
        }));
        self.next_index += other.next_index;
        self.graph_count += other.graph_count;
        self.speakers.extend(other.speakers);
        add_counts(&mut self.transitions, other.transitions);
        self.malformed_keys += other.malformed_keys;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimelineEntry;

    fn entry(speaker: &str, wordcount: u64) -> TimelineEntry {
        TimelineEntry {
            speaker: Some(speaker.to_string()),
            wordcount: Some(wordcount),
            ..TimelineEntry::default()
        }
    }

    fn graph(speakers: &[&str], transitions: &[(&str, u64)]) -> DecisionGraph {
        DecisionGraph {
            decision_id: None,
            timeline_points: speakers.iter().map(|s| entry(s, 10)).collect(),
            transitions: transitions
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            all_speakers: None,
        }
    }

    fn document(graphs: Vec<DecisionGraph>) -> DocumentRecord {
        DocumentRecord {
            decision_graphs: Some(graphs),
            ..DocumentRecord::default()
        }
    }

    #[test]
    fn test_points_are_indexed_across_documents() {
        let mut merger = GraphMerger::new();
        merger.fold(&document(vec![graph(&["A", "B", "C"], &[])]));
        merger.fold(&document(vec![graph(&["D", "E", "F"], &[])]));

        let global = merger.into_graph();

        assert_eq!(global.timeline_points.len(), 6);
        for (i, point) in global.timeline_points.iter().enumerate() {
            assert_eq!(point.index, i);
        }
        let order: Vec<_> = global.timeline_points.iter().map(|p| p.speaker.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_upstream_indices_are_replaced() {
        let mut g = graph(&["A", "B"], &[]);
        g.timeline_points[0].index = Some(41);
        g.timeline_points[1].index = Some(42);

        let mut merger = GraphMerger::new();
        merger.fold(&document(vec![g]));

        let global = merger.into_graph();
        assert_eq!(global.timeline_points[0].index, 0);
        assert_eq!(global.timeline_points[1].index, 1);
    }

    #[test]
    fn test_transitions_are_summed_per_ordered_pair() {
        let mut merger = GraphMerger::new();
        merger.fold(&document(vec![
            graph(&["A", "B"], &[("(A,B)", 2), ("(B,A)", 1)]),
            graph(&["A", "B"], &[("(A,B)", 3)]),
        ]));

        assert_eq!(merger.transitions().get(&TransitionKey::new("A", "B")), Some(&5));
        assert_eq!(merger.transitions().get(&TransitionKey::new("B", "A")), Some(&1));
        assert_eq!(merger.graph_count(), 2);
    }

    #[test]
    fn test_malformed_keys_are_skipped() {
        let mut merger = GraphMerger::new();
        merger.fold(&document(vec![graph(
            &["A", "B"],
            &[("(A,B)", 1), ("(A)", 4), ("(A,B,C)", 9)],
        )]));

        assert_eq!(merger.transitions().len(), 1);
        assert_eq!(merger.malformed_keys(), 2);
        assert_eq!(merger.point_count(), 2);
    }

    #[test]
    fn test_missing_speaker_uses_sentinel() {
        let mut g = graph(&["A"], &[]);
        g.timeline_points.push(TimelineEntry::default());

        let mut merger = GraphMerger::new();
        merger.fold(&document(vec![g]));
        let global = merger.into_graph();

        assert_eq!(global.timeline_points[1].speaker, crate::models::UNKNOWN_SPEAKER);
        assert_eq!(global.timeline_points[1].wordcount, 0);
        assert_eq!(global.timeline_points[1].snippet, "");
        assert_eq!(global.all_speakers, vec![crate::models::UNKNOWN_SPEAKER, "A"]);
    }

    #[test]
    fn test_merge_matches_sequential_fold() {
        let first = document(vec![graph(&["A", "B"], &[("(A,B)", 1)])]);
        let second = document(vec![
            graph(&["B", "C", "A"], &[("(B,C)", 1), ("(A,B)", 2)]),
            graph(&["C"], &[]),
        ]);

        let mut sequential = GraphMerger::new();
        sequential.fold(&first);
        sequential.fold(&second);

        let mut left = GraphMerger::new();
        left.fold(&first);
        let mut right = GraphMerger::new();
        right.fold(&second);
        left.merge(right);

        assert_eq!(left, sequential);
        assert_eq!(left.next_index, 6);
    }
}
