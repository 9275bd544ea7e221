//! Declarative required-field schemas and the routine that checks them.
//!
//! A schema is a static list of [`FieldSpec`]s. [`check_fields`] walks the
//! whole list without short-circuiting so one run reports every defect, then
//! descends into object fields that declare children.

use crate::outcome::{Category, Outcomes};
use serde_json::{Map, Value};
use std::fmt;

/// Semantic JSON type expected for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Object,
    Array,
    /// Presence is all that is checked.
    Any,
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
            FieldKind::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
            FieldKind::Any => "any",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the JSON type of `value`, as used in messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Checked when the field is present and is an object.
    pub children: &'static [FieldSpec],
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            children: &[],
        }
    }

    pub const fn object(name: &'static str, children: &'static [FieldSpec]) -> Self {
        Self {
            name,
            kind: FieldKind::Object,
            required: true,
            children,
        }
    }
}

const OWNER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::Any),
    FieldSpec::required("email", FieldKind::Any),
];

const AUTHOR_FIELDS: &[FieldSpec] = &[FieldSpec::required("name", FieldKind::Any)];

/// Top-level fields of the marketplace index.
pub const INDEX_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::required("version", FieldKind::String),
    FieldSpec::required("description", FieldKind::String),
    FieldSpec::object("owner", OWNER_FIELDS),
    FieldSpec::required("plugins", FieldKind::Array),
];

/// Fields of one entry in the index `plugins` array.
pub const PLUGIN_ENTRY_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::required("description", FieldKind::String),
    FieldSpec::required("source", FieldKind::String),
    FieldSpec::required("version", FieldKind::String),
];

/// Fields of a per-plugin manifest.
pub const MANIFEST_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::required("version", FieldKind::String),
    FieldSpec::required("description", FieldKind::String),
    FieldSpec::object("author", AUTHOR_FIELDS),
    FieldSpec::required("license", FieldKind::String),
];

/// Check `document` against `fields`, recording one outcome per field.
///
/// `scope` prefixes every message, e.g. `marketplace.json` or
/// `alpha/plugin.json`.
pub fn check_fields(
    document: &Map<String, Value>,
    fields: &[FieldSpec],
    scope: &str,
    outcomes: &mut Outcomes,
) {
    check_scoped(document, fields, scope, None, outcomes);
}

fn check_scoped(
    document: &Map<String, Value>,
    fields: &[FieldSpec],
    scope: &str,
    parent: Option<&str>,
    outcomes: &mut Outcomes,
) {
    for field in fields {
        let path = match parent {
            Some(parent) => format!("{parent}.{}", field.name),
            None => field.name.to_string(),
        };
        match document.get(field.name) {
            None if field.required => {
                outcomes.error(
                    Category::Schema,
                    format!("{scope}: field '{path}' missing"),
                );
            }
            None => {}
            Some(value) if !field.kind.matches(value) => {
                outcomes.error(
                    Category::Schema,
                    format!(
                        "{scope}: field '{path}' must be {}, found {}",
                        field.kind,
                        json_type_name(value)
                    ),
                );
            }
            Some(_) if field.kind == FieldKind::Any => {
                outcomes.success(Category::Schema, format!("{scope}: field '{path}' present"));
            }
            Some(_) => {
                outcomes.success(
                    Category::Schema,
                    format!("{scope}: field '{path}' present and valid"),
                );
            }
        }
    }

    for field in fields.iter().filter(|field| !field.children.is_empty()) {
        if let Some(Value::Object(nested)) = document.get(field.name) {
            let path = match parent {
                Some(parent) => format!("{parent}.{}", field.name),
                None => field.name.to_string(),
            };
            check_scoped(nested, field.children, scope, Some(&path), outcomes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Severity;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn messages(outcomes: &Outcomes, severity: Severity) -> Vec<String> {
        outcomes
            .in_order()
            .filter(|o| o.severity == severity)
            .map(|o| o.message.clone())
            .collect()
    }

    #[test]
    fn every_field_gets_an_outcome() {
        let doc = object(json!({
            "name": "market",
            "version": "1.0.0",
            "description": "plugins",
            "owner": {"name": "Ana", "email": "ana@example.com"},
            "plugins": []
        }));
        let mut outcomes = Outcomes::new();
        check_fields(&doc, INDEX_SCHEMA, "marketplace.json", &mut outcomes);
        // five top-level fields plus two owner fields
        assert_eq!(outcomes.successes().len(), 7);
        assert!(outcomes.errors().is_empty());
        assert_eq!(
            messages(&outcomes, Severity::Success).last().unwrap(),
            "marketplace.json: field 'owner.email' present"
        );
    }

    #[test]
    fn all_defects_are_reported_at_once() {
        let doc = object(json!({
            "name": 7,
            "owner": {"email": "ana@example.com"},
            "plugins": {}
        }));
        let mut outcomes = Outcomes::new();
        check_fields(&doc, INDEX_SCHEMA, "marketplace.json", &mut outcomes);
        assert_eq!(
            messages(&outcomes, Severity::Error),
            [
                "marketplace.json: field 'name' must be string, found number",
                "marketplace.json: field 'version' missing",
                "marketplace.json: field 'description' missing",
                "marketplace.json: field 'plugins' must be array, found object",
                "marketplace.json: field 'owner.name' missing",
            ]
        );
        assert!(outcomes.errors().iter().all(|o| o.category == Category::Schema));
    }

    #[test]
    fn mistyped_parent_skips_children() {
        let doc = object(json!({
            "name": "alpha",
            "version": "1.0.0",
            "description": "d",
            "author": "Ana",
            "license": "MIT"
        }));
        let mut outcomes = Outcomes::new();
        check_fields(&doc, MANIFEST_SCHEMA, "alpha/plugin.json", &mut outcomes);
        assert_eq!(
            messages(&outcomes, Severity::Error),
            ["alpha/plugin.json: field 'author' must be object, found string"]
        );
        assert_eq!(outcomes.successes().len(), 4);
    }

    #[test]
    fn optional_fields_are_silent_when_absent() {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::required("name", FieldKind::String),
            FieldSpec {
                required: false,
                ..FieldSpec::required("homepage", FieldKind::String)
            },
        ];
        let mut outcomes = Outcomes::new();
        check_fields(&object(json!({"name": "x"})), FIELDS, "doc", &mut outcomes);
        assert_eq!(outcomes.counts().total(), 1);

        let mut outcomes = Outcomes::new();
        check_fields(
            &object(json!({"name": "x", "homepage": false})),
            FIELDS,
            "doc",
            &mut outcomes,
        );
        assert_eq!(
            messages(&outcomes, Severity::Error),
            ["doc: field 'homepage' must be string, found boolean"]
        );
    }
}
