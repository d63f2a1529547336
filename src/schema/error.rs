//! Construction-time errors for form definitions

use miette::Diagnostic;
use thiserror::Error;

use crate::core::values::FieldNameError;

/// A form definition that cannot be turned into a wizard
///
/// These are programming or configuration mistakes, never user input
/// problems; building stops at the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SchemaError {
    #[error("form definition has no fields")]
    #[diagnostic(code(stepform::schema::no_fields))]
    NoFields,

    #[error("form definition has no steps")]
    #[diagnostic(code(stepform::schema::no_steps))]
    NoSteps,

    #[error("invalid field name: {0}")]
    #[diagnostic(
        code(stepform::schema::invalid_name),
        help("field names start with a letter and use only letters, digits, '_' or '-'")
    )]
    InvalidFieldName(#[from] FieldNameError),

    #[error("field '{0}' is declared more than once")]
    #[diagnostic(code(stepform::schema::duplicate_field))]
    DuplicateField(String),

    #[error("field '{field}' has an invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(stepform::schema::invalid_pattern))]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },

    #[error("pattern field '{0}' has no pattern constraint")]
    #[diagnostic(code(stepform::schema::missing_pattern))]
    MissingPattern(String),

    #[error("choice field '{0}' has no options")]
    #[diagnostic(code(stepform::schema::missing_options))]
    MissingOptions(String),

    #[error("rule '{rule}' cannot be used on {kind} field '{field}'")]
    #[diagnostic(code(stepform::schema::rule_kind_mismatch))]
    RuleKindMismatch {
        field: String,
        rule: &'static str,
        kind: String,
    },

    #[error("field '{field}' compares against '{other}', which is not a date field of this form")]
    #[diagnostic(code(stepform::schema::bad_field_reference))]
    BadFieldReference { field: String, other: String },

    #[error("step {step} ('{title}') has no fields")]
    #[diagnostic(code(stepform::schema::empty_step))]
    EmptyStep { step: usize, title: String },

    #[error("step {step} references unknown field '{field}'")]
    #[diagnostic(code(stepform::schema::unknown_field))]
    UnknownStepField { step: usize, field: String },

    #[error("field '{field}' is assigned to step {first} and step {second}")]
    #[diagnostic(
        code(stepform::schema::field_in_two_steps),
        help("every field belongs to exactly one step")
    )]
    FieldInTwoSteps {
        field: String,
        first: usize,
        second: usize,
    },

    #[error("field '{0}' is not assigned to any step")]
    #[diagnostic(
        code(stepform::schema::unassigned_field),
        help("every field belongs to exactly one step")
    )]
    UnassignedField(String),

    #[error("initial values contain unknown field '{0}'")]
    #[diagnostic(code(stepform::schema::unknown_initial_value))]
    UnknownInitialValue(String),
}
