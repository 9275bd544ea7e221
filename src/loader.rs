//! JSON document loading for the index and plugin manifests.
//!
//! Load failures are data, not control flow: [`load_document`] turns every
//! attempt into exactly one outcome and hands back the parsed object only on
//! success.

use crate::outcome::{Category, Outcomes};
use crate::relative_to_root;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// A parsed top-level JSON object.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    NotFound { path: String },
    #[error("could not read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid JSON in {path}: expected an object, found {found}")]
    NotAnObject { path: String, found: &'static str },
}

impl LoadError {
    pub fn category(&self) -> Category {
        match self {
            LoadError::NotFound { .. } => Category::Reference,
            LoadError::Io { .. } | LoadError::Parse { .. } | LoadError::NotAnObject { .. } => {
                Category::Syntax
            }
        }
    }
}

/// Read and parse `path` without recording anything.
pub fn read_document(path: &Path) -> Result<Document, LoadError> {
    read_labeled(path, &path.display().to_string())
}

/// Read and parse `path`, recording one outcome named relative to `root`.
pub fn load_document(path: &Path, root: &Path, outcomes: &mut Outcomes) -> Option<Document> {
    let label = relative_to_root(path, root);
    match read_labeled(path, &label) {
        Ok(document) => {
            outcomes.success(Category::Syntax, format!("valid JSON: {label}"));
            Some(document)
        }
        Err(err) => {
            outcomes.error(err.category(), err.to_string());
            None
        }
    }
}

fn read_labeled(path: &Path, label: &str) -> Result<Document, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: label.to_string(),
            }
        } else {
            LoadError::Io {
                path: label.to_string(),
                source,
            }
        }
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
        path: label.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::NotAnObject {
            path: label.to_string(),
            found: crate::schema::json_type_name(&other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Severity;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_one_error() {
        let temp = TempDir::new().unwrap();
        let mut outcomes = Outcomes::new();
        let doc = load_document(&temp.path().join("nope.json"), temp.path(), &mut outcomes);
        assert!(doc.is_none());
        assert_eq!(outcomes.errors().len(), 1);
        assert_eq!(outcomes.errors()[0].message, "file not found: nope.json");
        assert!(outcomes.successes().is_empty());
    }

    #[test]
    fn malformed_json_reports_position() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{\"name\": ").unwrap();
        let mut outcomes = Outcomes::new();
        assert!(load_document(&path, temp.path(), &mut outcomes).is_none());
        let err = &outcomes.errors()[0];
        assert_eq!(err.category, Category::Syntax);
        assert!(err.message.starts_with("invalid JSON in bad.json: "));
        assert!(err.message.contains("line 1"), "{}", err.message);
    }

    #[test]
    fn non_object_document_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject { found: "array", .. }));
    }

    #[test]
    fn valid_document_records_success() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ok.json");
        fs::write(&path, r#"{"name": "alpha"}"#).unwrap();
        let mut outcomes = Outcomes::new();
        let doc = load_document(&path, temp.path(), &mut outcomes).unwrap();
        assert_eq!(doc["name"], "alpha");
        let recorded: Vec<_> = outcomes.in_order().collect();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].severity, Severity::Success);
        assert_eq!(recorded[0].message, "valid JSON: ok.json");
    }
}
