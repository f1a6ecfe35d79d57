//! Filter form error types

use crate::model::FieldKind;

/// Errors that can occur while editing or resetting a filter form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// The form has no schema, either because it was never initialized or
    /// because its last initialization failed.
    #[error("filter form is not initialized")]
    NotInitialized,

    /// The edited name is not part of the schema.
    #[error("unknown filter field '{0}'")]
    UnknownField(String),

    /// The edited value does not match the field's kind.
    #[error("value for field '{field}' is not a valid {kind} value (got {found})")]
    TypeMismatch {
        /// Name of the edited field.
        field: String,
        /// Kind of the edited field.
        kind: FieldKind,
        /// Type of the rejected value.
        found: &'static str,
    },

    /// A select value is not one of the field's options.
    #[error("'{value}' is not an option of field '{field}'")]
    UnknownOption {
        /// Name of the edited field.
        field: String,
        /// The rejected option value.
        value: String,
    },
}
