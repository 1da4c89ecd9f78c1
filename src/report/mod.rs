//! Report generation.
//!
//! Markdown and JSON renderings of the aggregated summary, plus a view of a
//! single document. The report layer only reads the summary; timeline
//! coalescing happens here, on demand.

pub mod document;
pub mod generator;

pub use document::{find_document, generate_document_json, generate_document_markdown};
pub use generator::{generate_json_report, generate_markdown_report, Report, ReportMetadata};
