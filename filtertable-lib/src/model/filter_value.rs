//! Filter value snapshots

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::ser::SerializeMap;

use super::FieldSchema;
use super::Value;
use crate::error::FormError;
use crate::error::SchemaError;

/// A partial filter value keyed by field name.
///
/// Used for initial values: fields missing from the map take their schema
/// default.
pub type PartialFilter = BTreeMap<String, Value>;

/// A snapshot of every filter field's current value.
///
/// A `FilterValue` always holds exactly one value per schema field, stored in
/// declaration order next to the schema it was built from, so its key set
/// cannot drift from the schema's name set. Snapshots are immutable; edits
/// produce a new snapshot via [`FilterValue::with`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue {
    schema: Arc<FieldSchema>,
    values: Vec<Value>,
}

impl FilterValue {
    /// Builds the snapshot where every field holds its schema default.
    pub fn defaults(schema: Arc<FieldSchema>) -> Self {
        let values = schema.fields().iter().map(|f| f.default_value()).collect();
        Self { schema, values }
    }

    /// Resolves every field from `initial`, falling back to the schema default.
    ///
    /// Entries of `initial` that name no schema field are ignored.
    pub fn resolve(schema: Arc<FieldSchema>, initial: &PartialFilter) -> Result<Self, SchemaError> {
        let mut values = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            match initial.get(&field.name) {
                Some(value) => {
                    field
                        .check(value)
                        .map_err(|_| SchemaError::InvalidInitialValue {
                            field: field.name.clone(),
                            kind: field.kind,
                        })?;
                    values.push(value.clone());
                }
                None => values.push(field.default_value()),
            }
        }
        for name in initial.keys() {
            if schema.get(name).is_none() {
                log::debug!("Ignoring initial value for unknown filter field '{}'", name);
            }
        }
        Ok(Self { schema, values })
    }

    /// Returns a new snapshot with `name` set to `value`.
    pub fn with(&self, name: &str, value: Value) -> Result<Self, FormError> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.schema.fields()[index].check(&value)?;

        let mut values = self.values.clone();
        values[index] = value;
        Ok(Self {
            schema: Arc::clone(&self.schema),
            values,
        })
    }

    /// Returns the schema this snapshot was built from.
    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema.names().zip(self.values.iter())
    }

    /// Returns the field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.names()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for FilterValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
