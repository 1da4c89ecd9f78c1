//! Coalescing of consecutive same-speaker timeline points.

use crate::models::TimelinePoint;

/// Separator placed between snippets of merged points.
pub const SNIPPET_DELIMITER: &str = " ... ";

/// Merge every run of consecutive points sharing a speaker into one segment.
///
/// A segment keeps the index of its first point, sums the word counts,
/// joins the non-empty snippets with [`SNIPPET_DELIMITER`] and carries a
/// vote if any merged point did. Total word count is conserved and the
/// output has one segment per maximal run.
pub fn coalesce(points: &[TimelinePoint]) -> Vec<TimelinePoint> {
    let mut segments = Vec::new();
    let mut iter = points.iter();

    let Some(first) = iter.next() else {
        return segments;
    };
    let mut current = first.clone();

    for point in iter {
        if point.speaker == current.speaker {
            current.wordcount = current.wordcount.saturating_add(point.wordcount);
            if !point.snippet.is_empty() {
                if !current.snippet.is_empty() {
                    current.snippet.push_str(SNIPPET_DELIMITER);
                }
                current.snippet.push_str(&point.snippet);
            }
            current.has_vote |= point.has_vote;
        } else {
            segments.push(std::mem::replace(&mut current, point.clone()));
        }
    }

    segments.push(current);
    segments
}
