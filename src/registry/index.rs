//! Marketplace index validation.

use crate::RegistryLayout;
use crate::loader::{Document, load_document};
use crate::outcome::{Category, Outcomes};
use crate::schema::{INDEX_SCHEMA, PLUGIN_ENTRY_SCHEMA, check_fields};
use serde_json::{Map, Value};
use std::path::Path;

/// Borrowed view of one object in the index `plugins` array.
///
/// Fields are `None` when absent or not strings; the schema pass reports
/// those defects, this view only exposes what can be used as a key.
#[derive(Clone, Copy, Debug)]
pub struct PluginEntry<'a> {
    pub position: usize,
    pub name: Option<&'a str>,
    pub version: Option<&'a str>,
    pub source: Option<&'a str>,
}

impl<'a> PluginEntry<'a> {
    pub fn from_object(position: usize, fields: &'a Map<String, Value>) -> Self {
        Self {
            position,
            name: fields.get("name").and_then(Value::as_str),
            version: fields.get("version").and_then(Value::as_str),
            source: fields.get("source").and_then(Value::as_str),
        }
    }

    /// Name for messages; falls back to the array position.
    pub fn label(&self) -> String {
        match self.name {
            Some(name) => name.to_string(),
            None => format!("plugin_{}", self.position),
        }
    }
}

/// The raw `plugins` array, or an empty slice when absent or mistyped.
pub fn plugin_list(index: &Document) -> &[Value] {
    index
        .get("plugins")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Object entries of the `plugins` array, in declaration order.
pub fn plugin_entries(index: &Document) -> impl Iterator<Item = PluginEntry<'_>> {
    plugin_list(index)
        .iter()
        .enumerate()
        .filter_map(|(position, value)| {
            value
                .as_object()
                .map(|fields| PluginEntry::from_object(position, fields))
        })
}

/// Load the index and validate its fields and plugin entries.
///
/// Returns `None` when the document could not be loaded; the caller cannot
/// reconcile anything without it.
pub fn check_index(
    root: &Path,
    layout: &RegistryLayout,
    outcomes: &mut Outcomes,
) -> Option<Document> {
    let label = layout.index_label();
    let index = load_document(&layout.index_file(root), root, outcomes)?;

    check_fields(&index, INDEX_SCHEMA, &label, outcomes);

    if index.get("plugins").is_some_and(Value::is_array) {
        let entries = plugin_list(&index);
        outcomes.note(format!("{label}: {} plugins registered", entries.len()));

        for (position, value) in entries.iter().enumerate() {
            let Some(fields) = value.as_object() else {
                outcomes.error(
                    Category::Schema,
                    format!("{label}: plugins[{position}] is not an object"),
                );
                continue;
            };
            let entry = PluginEntry::from_object(position, fields);
            let scope = format!("{label}: plugins[{position}] ({})", entry.label());
            check_fields(fields, PLUGIN_ENTRY_SCHEMA, &scope, outcomes);
        }
    }

    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Severity;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_index(root: &Path, value: &Value) {
        let path = RegistryLayout::default().index_file(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn entries_are_checked_with_position_and_name() {
        let temp = TempDir::new().unwrap();
        write_index(
            temp.path(),
            &json!({
                "name": "market",
                "version": "1.0.0",
                "description": "d",
                "owner": {"name": "Ana", "email": "ana@example.com"},
                "plugins": [
                    {"name": "alpha", "description": "a", "source": "./plugins/alpha"},
                    "beta",
                    {"description": "c", "source": "./plugins/c", "version": "1.0.0"}
                ]
            }),
        );
        let mut outcomes = Outcomes::new();
        let index = check_index(temp.path(), &RegistryLayout::default(), &mut outcomes);
        assert!(index.is_some());

        let errors: Vec<_> = outcomes
            .in_order()
            .filter(|o| o.severity == Severity::Error)
            .map(|o| o.message.as_str())
            .collect();
        assert_eq!(
            errors,
            [
                "marketplace.json: plugins[0] (alpha): field 'version' missing",
                "marketplace.json: plugins[1] is not an object",
                "marketplace.json: plugins[2] (plugin_2): field 'name' missing",
            ]
        );
        assert_eq!(outcomes.notes()[0].message, "marketplace.json: 3 plugins registered");
    }

    #[test]
    fn unreadable_index_returns_none() {
        let temp = TempDir::new().unwrap();
        let mut outcomes = Outcomes::new();
        assert!(check_index(temp.path(), &RegistryLayout::default(), &mut outcomes).is_none());
        assert_eq!(outcomes.errors().len(), 1);
        assert_eq!(
            outcomes.errors()[0].message,
            "file not found: .claude-plugin/marketplace.json"
        );
    }

    #[test]
    fn plugin_entries_skip_non_objects() {
        let index = match json!({"plugins": [{"name": "a", "version": 1}, 3, {"name": "b"}]}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let entries: Vec<_> = plugin_entries(&index).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, Some("a"));
        assert_eq!(entries[0].version, None);
        assert_eq!(entries[1].position, 2);
    }
}
