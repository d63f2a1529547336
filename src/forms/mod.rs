//! Built-in form definitions

pub mod invoice;

use crate::schema::{SchemaError, WizardDefinition};

/// A form shipped with the binary
#[derive(Debug, Clone, Copy)]
pub struct BuiltinForm {
    /// Name used on the command line
    pub name: &'static str,
    /// Prefix of submission record ids
    pub record_prefix: &'static str,
    pub build: fn() -> Result<WizardDefinition, SchemaError>,
}

/// All built-in forms; the first one is the default
pub const BUILTIN_FORMS: &[BuiltinForm] = &[BuiltinForm {
    name: "invoice",
    record_prefix: invoice::RECORD_PREFIX,
    build: invoice::definition,
}];

/// Look up a built-in form by name, case-insensitively
pub fn builtin(name: &str) -> Option<&'static BuiltinForm> {
    BUILTIN_FORMS
        .iter()
        .find(|form| form.name.eq_ignore_ascii_case(name))
}

/// The form used when neither `--form` nor configuration names one
pub fn default_form() -> &'static BuiltinForm {
    &BUILTIN_FORMS[0]
}
