//! Declarative filter field schema

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::error::FormError;
use crate::error::SchemaError;

/// The input kind of a filter field.
///
/// The kind decides the field's default value, which [`Value`] variants it
/// accepts and how it is sanitized into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text, matched by the provider.
    Text,
    /// One value out of the field's options.
    Select,
    /// Any number of values out of the field's options.
    MultiSelect,
    /// A checkbox.
    Boolean,
    /// A numeric input.
    Number,
}

impl FieldKind {
    /// Returns the value a field of this kind starts with when neither an
    /// explicit default nor an initial value is given.
    pub fn default_value(self) -> Value {
        match self {
            Self::Text | Self::Select => Value::Text(String::new()),
            Self::MultiSelect => Value::List(Vec::new()),
            Self::Boolean => Value::Bool(false),
            Self::Number => Value::Null,
        }
    }

    /// Returns `true` if a field of this kind can hold `value`.
    ///
    /// Booleans and numbers also accept `Null`, their "unset" state.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Text | Self::Select => matches!(value, Value::Text(_)),
            Self::MultiSelect => matches!(value, Value::List(_)),
            Self::Boolean => matches!(value, Value::Bool(_) | Value::Null),
            Self::Number => matches!(value, Value::Number(_) | Value::Null),
        }
    }

    /// Returns `true` if fields of this kind must declare options.
    pub fn requires_options(self) -> bool {
        match self {
            Self::Select | Self::MultiSelect => true,
            Self::Text | Self::Boolean | Self::Number => false,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::MultiSelect => "multiselect",
            Self::Boolean => "boolean",
            Self::Number => "number",
        };
        f.write_str(name)
    }
}

/// A selectable option of a select or multi-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label.
    pub label: String,
    /// Value stored in the filter when the option is chosen.
    pub value: String,
}

impl FieldOption {
    /// Creates a new option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for FieldOption {
    /// Creates an option whose label and value are the same string.
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

/// Describes one filterable field.
///
/// # Example
///
/// ```
/// use filtertable_lib::model::{FieldDescriptor, Value};
///
/// let name = FieldDescriptor::text("name", "Name").with_placeholder("Search by name");
/// let kind = FieldDescriptor::multi_select("type", "Type", ["Equity", "BankAccount"]);
/// let private = FieldDescriptor::boolean("isPrivate", "Private").with_default(Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique identifier of the field's control.
    pub id: String,
    /// Key of the field in the emitted filter value.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Input kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Options for select and multi-select fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Placeholder hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Explicit default, replacing the kind default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// Creates a descriptor whose `id` equals its `name`.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            label: label.into(),
            kind,
            options: Vec::new(),
            placeholder: None,
            default: None,
        }
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Creates a single-select field.
    pub fn select<O: Into<FieldOption>>(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select).with_options(options)
    }

    /// Creates a multi-select field.
    pub fn multi_select<O: Into<FieldOption>>(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        Self::new(name, label, FieldKind::MultiSelect).with_options(options)
    }

    /// Creates a boolean field.
    pub fn boolean(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Boolean)
    }

    /// Creates a number field.
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    /// Sets the control id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the options.
    pub fn with_options<O: Into<FieldOption>>(
        mut self,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the placeholder hint.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets an explicit default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Returns the value this field takes on initialize and reset.
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.default_value())
    }

    /// Returns `true` if `value` is one of this field's option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Checks that `value` can be stored in this field.
    ///
    /// Select values must be empty or one of the options; every multi-select
    /// item must be one of the options.
    pub fn check(&self, value: &Value) -> Result<(), FormError> {
        if !self.kind.accepts(value) {
            return Err(FormError::TypeMismatch {
                field: self.name.clone(),
                kind: self.kind,
                found: value.type_name(),
            });
        }
        let unknown = match (self.kind, value) {
            (FieldKind::Select, Value::Text(v)) if !v.is_empty() && !self.has_option(v) => Some(v),
            (FieldKind::MultiSelect, Value::List(items)) => {
                items.iter().find(|item| !self.has_option(item))
            }
            _ => None,
        };
        match unknown {
            Some(v) => Err(FormError::UnknownOption {
                field: self.name.clone(),
                value: v.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// An ordered, validated set of field descriptors.
///
/// Construction enforces the schema invariants: unique names and ids,
/// options on every select and multi-select field, and explicit defaults of
/// the right type. A `FieldSchema` is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FieldSchema {
    fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    /// Validates `fields` and builds a schema.
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>) -> Result<Self, SchemaError> {
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();
        let mut names = HashSet::new();
        let mut ids = HashSet::new();

        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateName(field.name.clone()));
            }
            if !ids.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateId(field.id.clone()));
            }
            if field.kind.requires_options() && field.options.is_empty() {
                return Err(SchemaError::MissingOptions {
                    field: field.name.clone(),
                    kind: field.kind,
                });
            }
            if let Some(default) = &field.default
                && field.check(default).is_err()
            {
                return Err(SchemaError::InvalidDefault {
                    field: field.name.clone(),
                    kind: field.kind,
                });
            }
        }

        Ok(Self { fields })
    }

    /// Creates a schema with no fields.
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Returns the descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the descriptor with the given name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the declaration position of the field with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FieldSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FieldSchema> for Vec<FieldDescriptor> {
    fn from(schema: FieldSchema) -> Self {
        schema.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults() {
        assert_eq!(FieldKind::Text.default_value(), Value::from(""));
        assert_eq!(FieldKind::Select.default_value(), Value::from(""));
        assert_eq!(FieldKind::MultiSelect.default_value(), Value::List(vec![]));
        assert_eq!(FieldKind::Boolean.default_value(), Value::Bool(false));
        assert_eq!(FieldKind::Number.default_value(), Value::Null);
    }

    #[test]
    fn test_select_without_options_is_rejected() {
        let currency = FieldDescriptor::new("currency", "Currency", FieldKind::Select);
        let err = FieldSchema::new([currency]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingOptions {
                field: "currency".to_string(),
                kind: FieldKind::Select,
            }
        );
        assert_eq!(err.field(), "currency");
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = FieldSchema::new([
            FieldDescriptor::text("name", "Name"),
            FieldDescriptor::text("name", "Other").with_id("other"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("name".to_string()));
    }

    #[test]
    fn test_invalid_default_is_rejected() {
        let err = FieldSchema::new([FieldDescriptor::boolean("flag", "Flag").with_default("yes")])
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn test_check_options() {
        let field = FieldDescriptor::multi_select("type", "Type", ["Equity", "Generic"]);
        assert!(field.check(&Value::from(vec!["Equity"])).is_ok());
        assert_eq!(
            field.check(&Value::from(vec!["Equity", "Bond"])),
            Err(FormError::UnknownOption {
                field: "type".to_string(),
                value: "Bond".to_string(),
            })
        );
        assert!(matches!(
            field.check(&Value::from("Equity")),
            Err(FormError::TypeMismatch { found: "text", .. })
        ));

        let select = FieldDescriptor::select("currency", "Currency", ["USD"]);
        assert!(select.check(&Value::from("")).is_ok());
        assert!(select.check(&Value::from("GBP")).is_err());
    }

    #[test]
    fn test_deserialize_schema() {
        let json = r#"[
            {"id": "name", "name": "name", "label": "Name", "type": "text"},
            {"id": "type", "name": "type", "label": "Type", "type": "multiselect",
             "options": [{"label": "Equity", "value": "Equity"}]}
        ]"#;
        let schema: FieldSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["name", "type"]);
        assert_eq!(schema.get("type").map(|f| f.kind), Some(FieldKind::MultiSelect));

        let bad = r#"[{"id": "c", "name": "c", "label": "C", "type": "select"}]"#;
        assert!(serde_json::from_str::<FieldSchema>(bad).is_err());
    }
}
