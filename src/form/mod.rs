//! Action configuration forms
//!
//! Configurable actions describe the input they need as a [`FormSpec`]. The
//! operator's answers travel as [`ConfigData`], a flat map of field names to
//! text values, and validation reports problems per field so the caller can
//! redisplay the form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of input a field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Yes/no answer, stored as `"1"` or `"0"`
    Checkbox,
}

/// One input on a configuration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: Option<String>,
}

impl FormField {
    #[must_use]
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Text,
            required: false,
            description: None,
        }
    }

    #[must_use]
    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Checkbox,
            ..Self::text(name, label)
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Form contract of a configurable action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    pub fields: Vec<FormField>,
}

impl FormSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that every required field has a value
    ///
    /// A required checkbox must be ticked.
    #[must_use]
    pub fn check_required(&self, input: &ConfigData) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in self.fields.iter().filter(|f| f.required) {
            let present = match field.kind {
                FieldKind::Text => input.get(&field.name).is_some_and(|v| !v.trim().is_empty()),
                FieldKind::Checkbox => input.flag(&field.name),
            };
            if !present {
                errors.add(&field.name, format!("{} field is required.", field.label));
            }
        }
        errors
    }
}

/// Values entered on a configuration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData(BTreeMap<String, String>);

impl ConfigData {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Checkbox value, true for `1`, `true`, `yes` or `on`
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a `key=value` pair as given on the command line
    ///
    /// # Errors
    ///
    /// Returns the offending text if there is no `=` or the key is empty.
    pub fn parse_assignment(text: &str) -> Result<(String, String), String> {
        match text.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("Expected KEY=VALUE, got '{text}'")),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A validation problem on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating configuration input, empty when valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors reported for `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Append another set of errors
    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> FormSpec {
        FormSpec::new()
            .field(FormField::text("field", "Field").required())
            .field(FormField::text("note", "Note"))
            .field(FormField::checkbox("confirm", "Confirm").required())
    }

    #[test]
    fn test_required_fields_missing() {
        let errors = sample_form().check_required(&ConfigData::new());
        assert!(!errors.is_valid());
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.for_field("field").count(), 1);
        assert_eq!(errors.for_field("confirm").count(), 1);
    }

    #[test]
    fn test_required_fields_present() {
        let input = ConfigData::new().with("field", "title").with("confirm", "yes");
        assert!(sample_form().check_required(&input).is_valid());
    }

    #[test]
    fn test_blank_text_is_missing() {
        let input = ConfigData::new().with("field", "   ").with("confirm", "1");
        let errors = sample_form().check_required(&input);
        assert_eq!(errors.errors()[0].field, "field");
        assert_eq!(errors.errors()[0].message, "Field field is required.");
    }

    #[test]
    fn test_unticked_checkbox_is_missing() {
        let input = ConfigData::new().with("field", "title").with("confirm", "0");
        assert!(!sample_form().check_required(&input).is_valid());
    }

    #[test]
    fn test_flag_values() {
        let data: ConfigData = [("a", "On"), ("b", "TRUE"), ("c", "no"), ("d", "")]
            .into_iter()
            .collect();
        assert!(data.flag("a"));
        assert!(data.flag("b"));
        assert!(!data.flag("c"));
        assert!(!data.flag("d"));
        assert!(!data.flag("missing"));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            ConfigData::parse_assignment("field=a=b").unwrap(),
            ("field".to_string(), "a=b".to_string())
        );
        assert!(ConfigData::parse_assignment("novalue").is_err());
        assert!(ConfigData::parse_assignment("=value").is_err());
    }

    #[test]
    fn test_validation_display() {
        let mut errors = ValidationErrors::new();
        errors.add("field", "bad");
        errors.add("value", "empty");
        assert_eq!(errors.to_string(), "field: bad; value: empty");
    }
}
