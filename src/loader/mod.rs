//! Input loading and validation.
//!
//! The input is a JSON file holding a list of document records. It is
//! accepted in full or not at all: any structural problem yields an empty
//! document list so callers can render a normal "no data" state.

use crate::models::DocumentRecord;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an input file was rejected.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("top-level JSON value is not a list of documents")]
    NotAList,

    #[error("document #{index} is not a JSON object")]
    NotARecord { index: usize },

    #[error("document #{index} does not match the record layout: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the document list at `path`, or an empty list if it is unusable.
pub fn load(path: &Path) -> Vec<DocumentRecord> {
    match try_load(path) {
        Ok(documents) => {
            info!("Loaded {} documents from {}", documents.len(), path.display());
            documents
        }
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Load the document list at `path`, reporting why it was rejected.
pub fn try_load(path: &Path) -> Result<Vec<DocumentRecord>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    parse_documents(&content)
}

/// Validate and decode a document list from JSON text.
pub fn parse_documents(content: &str) -> Result<Vec<DocumentRecord>, LoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let value: Value = serde_json::from_str(content).map_err(LoadError::Parse)?;

    let Value::Array(items) = value else {
        return Err(LoadError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(LoadError::NotARecord { index });
            }
            serde_json::from_value(item).map_err(|source| LoadError::InvalidRecord { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("extracted.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_input(
            &temp_dir,
            r##"[{"file": "a.txt", "decisions": [{"rapporteur": "#VEDEL"}]}, {}]"##,
        );

        let documents = load(&path);

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].file.as_deref(), Some("a.txt"));
        assert_eq!(documents[0].decisions().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        assert!(load(&path).is_empty());
        assert!(matches!(try_load(&path), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_input(&temp_dir, "[{\"file\": ");

        assert!(load(&path).is_empty());
        assert!(matches!(try_load(&path), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_load_object_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_input(&temp_dir, r#"{"file": "a.txt"}"#);

        assert!(load(&path).is_empty());
        assert!(matches!(try_load(&path), Err(LoadError::NotAList)));
    }

    #[test]
    fn test_rejects_non_object_element() {
        let result = parse_documents(r#"[{}, 42]"#);
        assert!(matches!(result, Err(LoadError::NotARecord { index: 1 })));
    }

    #[test]
    fn test_rejects_whole_input_on_bad_record() {
        let result = parse_documents(r#"[{}, {"global_stats": {"total_words": "many"}}]"#);
        assert!(matches!(result, Err(LoadError::InvalidRecord { index: 1, .. })));
    }

    #[test]
    fn test_accepts_empty_list_and_bom() {
        assert!(parse_documents("[]").unwrap().is_empty());
        assert_eq!(parse_documents("\u{feff}[{}]").unwrap().len(), 1);
    }

    #[test]
    fn test_null_presence_fields_read_as_defaults() {
        let documents = parse_documents(
            r#"[
                {"file": "a.txt", "votes": []},
                {"presence_absence": {"all_present": null, "absent_list": null, "exceptions": null}}
            ]"#,
        )
        .unwrap();

        assert_eq!(documents.len(), 2);
        let presence = documents[1].presence_absence.as_ref().unwrap();
        assert!(presence.is_empty());
    }

    #[test]
    fn test_null_stats_fields_read_as_defaults() {
        let documents = parse_documents(
            r#"[{"global_stats": {"total_paragraphs": null, "total_words": 12, "speakers_global_count": null}}]"#,
        )
        .unwrap();

        let stats = documents[0].global_stats.as_ref().unwrap();
        assert_eq!(stats.total_paragraphs, 0);
        assert_eq!(stats.total_words, 12);
        assert!(stats.speakers_global_count.is_empty());
    }

    #[test]
    fn test_null_graph_fields_read_as_defaults() {
        let documents = parse_documents(
            r#"[
                {"decision_graphs": [{"decision_id": "59-1 DC", "timeline_points": null, "transitions": null}]},
                {"file": "b.txt"}
            ]"#,
        )
        .unwrap();

        assert_eq!(documents.len(), 2);
        let graph = &documents[0].decision_graphs()[0];
        assert!(graph.timeline_points.is_empty());
        assert!(graph.transitions.is_empty());
    }

    #[test]
    fn test_ignores_unknown_modules() {
        let documents =
            parse_documents(r#"[{"questions": [{"law_citations": []}], "votes": null}]"#).unwrap();

        assert_eq!(documents.len(), 1);
        assert!(documents[0].votes().is_empty());
    }
}
