//! Schema system - field rules, step partition, validation and loading

pub mod constraint;
pub mod definition;
pub mod error;
pub mod field;
pub mod loader;
pub mod validator;

pub use constraint::{Constraint, Predicate, Rule};
pub use definition::{DefinitionBuilder, StepDefinition, WizardDefinition};
pub use error::SchemaError;
pub use field::{ChoiceOption, FieldKind, FieldSpec};
pub use loader::{load_definition, DefinitionError, DefinitionLoader};
pub use validator::{validate, validate_all, validate_field, ValidationResult};
