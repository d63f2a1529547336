//! Stepform: multi-step form wizards
//!
//! A form's fields are partitioned into ordered steps. The wizard only moves
//! forward when the current step's fields are valid, and only submits once
//! every field across all steps is valid.

pub mod cli;
pub mod core;
pub mod forms;
pub mod schema;
pub mod wizard;

pub use crate::core::values::{FieldName, FormValues};
pub use crate::schema::{FieldSpec, SchemaError, ValidationResult, WizardDefinition};
pub use crate::wizard::{SubmissionSink, ValidationMode, WizardController};
