//! Minutes Aggregator - cross-document statistics for meeting minutes
//!
//! Takes the per-document analysis records produced by an upstream
//! extraction step (attendance, law citations, text statistics, decisions,
//! per-decision speaker graphs and votes) and folds them into one
//! [`AggregatedSummary`](models::AggregatedSummary) together with a single
//! global speaker graph spanning every document.
//!
//! ```no_run
//! use minutes_aggregator::{aggregate, coalesce, loader};
//! use std::path::Path;
//!
//! let documents = loader::load(Path::new("extracted_data_modular_all_modules.json"));
//! let summary = aggregate(&documents);
//! let segments = coalesce(&summary.global_graph.timeline_points);
//! println!("{} documents, {} speaking segments", summary.document_count, segments.len());
//! ```

pub mod analysis;
pub mod loader;
pub mod models;

pub use analysis::{aggregate, coalesce, Aggregator};
