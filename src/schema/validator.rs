//! Validation engine - evaluates field constraints against current values
//!
//! Validation is a pure function of the definition, the values and the
//! requested field subset. Per field, the raw text is first coerced
//! according to the field kind; a coercion failure is the field's error.
//! Otherwise constraints run in declaration order and the first failing one
//! supplies the message.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::str::FromStr;

use crate::core::values::{FieldName, FormValues};
use crate::schema::constraint::{Constraint, Rule};
use crate::schema::definition::WizardDefinition;
use crate::schema::field::{FieldKind, FieldSpec};

/// Message for numeric input that does not parse
pub const NOT_A_NUMBER: &str = "not a valid number";
/// Message for date input that does not parse
pub const NOT_A_DATE: &str = "not a valid date";
/// Message for choice input outside the option list
pub const NOT_A_CHOICE: &str = "not a valid choice";

/// Per-field outcome of a validation run, in evaluation order
///
/// `None` marks a valid field, `Some(message)` an invalid one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    entries: Vec<(FieldName, Option<String>)>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the outcome for a field
    pub fn insert(&mut self, name: FieldName, error: Option<String>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = error,
            None => self.entries.push((name, error)),
        }
    }

    /// True when no evaluated field has an error
    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(|(_, e)| e.is_none())
    }

    /// Whether the field was part of this result
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.as_str() == name)
    }

    /// Error message for a field, if it was evaluated and failed
    pub fn error(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .and_then(|(_, e)| e.as_deref())
    }

    /// Failing fields and their messages
    pub fn errors(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.entries
            .iter()
            .filter_map(|(n, e)| e.as_deref().map(|msg| (n, msg)))
    }

    /// Every evaluated field with its outcome
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, Option<&str>)> {
        self.entries.iter().map(|(n, e)| (n, e.as_deref()))
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay a newer run; fields it evaluated replace older outcomes
    pub fn merge(&mut self, newer: &ValidationResult) {
        for (name, error) in &newer.entries {
            self.insert(name.clone(), error.clone());
        }
    }

    /// Outcomes for the given fields only, in the given order
    pub fn restricted_to(&self, names: &[FieldName]) -> ValidationResult {
        let entries = names
            .iter()
            .filter_map(|name| {
                self.entries
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(n, e)| (n.clone(), e.clone()))
            })
            .collect();
        ValidationResult { entries }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, error) in &self.entries {
            map.serialize_entry(name.as_str(), error)?;
        }
        map.end()
    }
}

/// A raw value after kind-specific coercion
#[derive(Debug, Clone, PartialEq)]
enum Coerced {
    Unset,
    Text,
    Number(Decimal),
    Date(NaiveDate),
}

/// Validate `subset` of the definition's fields against `values`
///
/// Names in `subset` that the definition does not declare are skipped.
pub fn validate(
    definition: &WizardDefinition,
    values: &FormValues,
    subset: &[FieldName],
) -> ValidationResult {
    let mut result = ValidationResult::new();
    for name in subset {
        let Some(spec) = definition.field(name.as_str()) else {
            continue;
        };
        result.insert(name.clone(), validate_field(definition, spec, values));
    }
    result
}

/// Validate every field of the definition
pub fn validate_all(definition: &WizardDefinition, values: &FormValues) -> ValidationResult {
    validate(definition, values, definition.field_names())
}

/// Validate one field, returning its first error
pub fn validate_field(
    definition: &WizardDefinition,
    spec: &FieldSpec,
    values: &FormValues,
) -> Option<String> {
    let raw = values.raw(spec.name());
    let coerced = match coerce(spec, raw) {
        Ok(c) => c,
        Err(message) => return Some(message.to_string()),
    };

    spec.constraints()
        .iter()
        .find(|c| !passes(c, raw, &coerced, definition, values))
        .map(|c| c.message().to_string())
}

fn coerce(spec: &FieldSpec, raw: &str) -> Result<Coerced, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Coerced::Unset);
    }
    match spec.kind() {
        FieldKind::Text | FieldKind::Pattern => Ok(Coerced::Text),
        FieldKind::Numeric => parse_number(trimmed).map(Coerced::Number).ok_or(NOT_A_NUMBER),
        FieldKind::Date => parse_date(trimmed).map(Coerced::Date).ok_or(NOT_A_DATE),
        FieldKind::EnumChoice => {
            if spec.options().iter().any(|o| o.value == trimmed) {
                Ok(Coerced::Text)
            } else {
                Err(NOT_A_CHOICE)
            }
        }
    }
}

/// Parse a decimal, accepting a lone `,` as the decimal separator
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.contains(',') && !raw.contains('.') && raw.matches(',').count() == 1 {
        Decimal::from_str(&raw.replace(',', ".")).ok()
    } else {
        Decimal::from_str(raw).ok()
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn passes(
    constraint: &Constraint,
    raw: &str,
    coerced: &Coerced,
    definition: &WizardDefinition,
    values: &FormValues,
) -> bool {
    match constraint.rule() {
        Rule::Required => *coerced != Coerced::Unset,
        // Text rules look at the raw input, set or not
        Rule::MinLength(limit) => raw.chars().count() >= *limit,
        Rule::MaxLength(limit) => raw.chars().count() <= *limit,
        Rule::Pattern(regex) => regex.is_match(raw),
        Rule::OneOf(options) => options.iter().any(|o| o == raw.trim()),
        // Typed rules hold vacuously for unset input
        Rule::Min(limit) => match coerced {
            Coerced::Number(n) => n >= limit,
            _ => true,
        },
        Rule::Max(limit) => match coerced {
            Coerced::Number(n) => n <= limit,
            _ => true,
        },
        Rule::NotBefore(earliest) => match coerced {
            Coerced::Date(d) => d >= earliest,
            _ => true,
        },
        Rule::NotBeforeField(other) => {
            let Coerced::Date(d) = coerced else {
                return true;
            };
            let other_date = definition
                .field(other.as_str())
                .filter(|spec| spec.kind() == FieldKind::Date)
                .and_then(|_| parse_date(values.raw(other.as_str())));
            match other_date {
                Some(earliest) => *d >= earliest,
                None => true,
            }
        }
        Rule::Custom(check) => (**check)(raw, values),
    }
}
