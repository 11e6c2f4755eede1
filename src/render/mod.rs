//! Display rendering of `_source` fields
//!
//! A document field can hold one value, many values, or objects nested inside
//! arrays at any depth. [`SourceField`] flattens a document so every scalar is
//! grouped under its key path with array positions ignored, then looks up a
//! dotted path and joins whatever values it finds.
//!
//! ```text
//! {"person": [{"first_name": "John"}, {"first_name": ["James", "Jacob"]}]}
//!
//! person.first_name  ->  "John, James, Jacob"
//! ```

use serde_json::Value;
use std::collections::BTreeMap;

/// Separator between path segments
pub const NESTED_SEPARATOR: &str = ".";

/// Joins multiple values in rendered output
const VALUE_SEPARATOR: &str = ", ";

/// Renders one display string for a row
pub trait FieldRenderer {
    /// Column heading
    fn label(&self) -> String;

    /// Render the value for `source`, empty when nothing is present
    fn render(&self, source: &Value) -> String;
}

/// Renders a dotted path out of a document's `_source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    path: String,
}

impl SourceField {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Every scalar stored under this path, in document order
    #[must_use]
    pub fn values(&self, source: &Value) -> Vec<String> {
        let flattened = flatten(source);
        flattened.get(&self.path).cloned().unwrap_or_default()
    }
}

impl FieldRenderer for SourceField {
    fn label(&self) -> String {
        self.path.clone()
    }

    fn render(&self, source: &Value) -> String {
        if !source.is_object() {
            return String::new();
        }

        self.values(source)
            .into_iter()
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(VALUE_SEPARATOR)
    }
}

/// Group every scalar in `source` by its key path, skipping array indices
#[must_use]
pub fn flatten(source: &Value) -> BTreeMap<String, Vec<String>> {
    let mut result = BTreeMap::new();
    collect(source, &mut Vec::new(), &mut result);
    result
}

fn collect<'a>(value: &'a Value, parents: &mut Vec<&'a str>, out: &mut BTreeMap<String, Vec<String>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                parents.push(key);
                collect(child, parents, out);
                parents.pop();
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, parents, out);
            }
        }
        Value::Null => {}
        scalar => {
            if parents.is_empty() {
                return;
            }
            let key = parents.join(NESTED_SEPARATOR);
            out.entry(key).or_default().push(scalar_text(scalar));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        other => other.to_string(),
    }
}
