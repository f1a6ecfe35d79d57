//! Filter form engine.
//!
//! [`FilterForm`] owns the current [`FilterValue`] built from a declarative
//! field schema and emits a full snapshot on every change. It has no debounce
//! policy of its own: each edit is its own emission.

use std::sync::Arc;

use crate::error::{FormError, SchemaError};
use crate::events::{EventEmitter, Subscription};
use crate::model::{FieldDescriptor, FieldSchema, FilterValue, PartialFilter, Value};

/// Filter form state and change notifications.
///
/// # Example
///
/// ```
/// use filtertable_lib::form::FilterForm;
/// use filtertable_lib::model::{FieldDescriptor, PartialFilter, Value};
///
/// let mut form = FilterForm::new();
/// let _sub = form.subscribe(|value| println!("filter: {:?}", value.get("name")));
///
/// form.initialize([FieldDescriptor::text("name", "Name")], &PartialFilter::new())?;
/// form.edit("name", "Demo")?;
/// assert_eq!(form.value().and_then(|v| v.get("name")), Some(&Value::from("Demo")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct FilterForm {
    /// Current snapshot; `None` until a schema initialized successfully.
    current: Option<FilterValue>,
    changes: EventEmitter<FilterValue>,
}

impl FilterForm {
    /// Create an uninitialized form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the form from `fields`, replacing any previous state.
    ///
    /// Each field takes its entry in `initial` if present, else its schema
    /// default. Emits the resolved value once. On error the form is left
    /// uninitialized.
    pub fn initialize(
        &mut self,
        fields: impl IntoIterator<Item = FieldDescriptor>,
        initial: &PartialFilter,
    ) -> Result<FilterValue, SchemaError> {
        match FieldSchema::new(fields) {
            Ok(schema) => self.initialize_schema(Arc::new(schema), initial),
            Err(e) => {
                self.current = None;
                Err(e)
            }
        }
    }

    /// Same as [`initialize`](Self::initialize) for an already validated schema.
    pub fn initialize_schema(
        &mut self,
        schema: Arc<FieldSchema>,
        initial: &PartialFilter,
    ) -> Result<FilterValue, SchemaError> {
        let value = match FilterValue::resolve(schema, initial) {
            Ok(value) => value,
            Err(e) => {
                self.current = None;
                return Err(e);
            }
        };
        log::debug!("Filter form initialized with {} field(s)", value.len());
        Ok(self.replace(value))
    }

    /// Set one field and emit the updated snapshot.
    pub fn edit(&mut self, name: &str, value: impl Into<Value>) -> Result<FilterValue, FormError> {
        let current = self.current.as_ref().ok_or(FormError::NotInitialized)?;
        let next = current.with(name, value.into())?;
        Ok(self.replace(next))
    }

    /// Restore every field to its schema default and emit once.
    ///
    /// Initial values given to `initialize` are not restored.
    pub fn reset(&mut self) -> Result<FilterValue, FormError> {
        let current = self.current.as_ref().ok_or(FormError::NotInitialized)?;
        let defaults = FilterValue::defaults(Arc::clone(current.schema()));
        Ok(self.replace(defaults))
    }

    /// Register a change listener.
    pub fn subscribe(&self, listener: impl FnMut(&FilterValue) + Send + 'static) -> Subscription {
        self.changes.subscribe(listener)
    }

    /// Current snapshot, if initialized.
    pub fn value(&self) -> Option<&FilterValue> {
        self.current.as_ref()
    }

    /// Current schema, if initialized.
    pub fn schema(&self) -> Option<&Arc<FieldSchema>> {
        self.current.as_ref().map(|v| v.schema())
    }

    /// Whether the last initialization succeeded.
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    fn replace(&mut self, value: FilterValue) -> FilterValue {
        self.current = Some(value.clone());
        self.changes.emit(&value);
        value
    }
}
