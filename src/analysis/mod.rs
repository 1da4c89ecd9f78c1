//! Aggregation engine.
//!
//! Category folders accumulate one document at a time, the graph merger
//! builds the global speaker graph, and the timeline coalescer merges
//! consecutive turns of the same speaker on demand.

pub mod aggregator;
pub mod graph;
pub mod timeline;

pub use aggregator::*;
pub use graph::GraphMerger;
pub use timeline::{coalesce, SNIPPET_DELIMITER};
