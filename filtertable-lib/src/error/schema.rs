//! Schema error types

use crate::model::FieldKind;

/// Errors raised while building a [`FieldSchema`](crate::model::FieldSchema)
/// or resolving its initial values.
///
/// These are fatal for the filter form: a form whose schema failed to
/// initialize stays uninitialized until a valid schema is applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Two descriptors share the same `name`.
    #[error("duplicate field name '{0}'")]
    DuplicateName(String),

    /// Two descriptors share the same `id`.
    #[error("duplicate field id '{0}'")]
    DuplicateId(String),

    /// A select or multi-select field was declared without options.
    #[error("field '{field}' of kind {kind} requires a non-empty options list")]
    MissingOptions {
        /// Name of the offending field.
        field: String,
        /// Kind of the offending field.
        kind: FieldKind,
    },

    /// An explicit default does not match the field's kind.
    #[error("default for field '{field}' is not a valid {kind} value")]
    InvalidDefault {
        /// Name of the offending field.
        field: String,
        /// Kind of the offending field.
        kind: FieldKind,
    },

    /// An initial value does not match the field's kind.
    #[error("initial value for field '{field}' is not a valid {kind} value")]
    InvalidInitialValue {
        /// Name of the offending field.
        field: String,
        /// Kind of the offending field.
        kind: FieldKind,
    },
}

impl SchemaError {
    /// Returns the name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::DuplicateName(name) | Self::DuplicateId(name) => name,
            Self::MissingOptions { field, .. }
            | Self::InvalidDefault { field, .. }
            | Self::InvalidInitialValue { field, .. } => field,
        }
    }
}
