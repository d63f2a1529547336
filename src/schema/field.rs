//! Field specifications

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::values::{FieldName, FormValues};
use crate::schema::constraint::{Constraint, Rule};

/// How a field's raw text is interpreted before constraints run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Decimal number
    Numeric,
    /// Calendar date (YYYY-MM-DD)
    Date,
    /// Text that must match a pattern
    Pattern,
    /// One value out of a fixed list
    EnumChoice,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Numeric => write!(f, "numeric"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Pattern => write!(f, "pattern"),
            FieldKind::EnumChoice => write!(f, "enum_choice"),
        }
    }
}

/// One selectable value of an enum-choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A single named input and its validation rules
///
/// Built with the kind-specific constructors and chained setters. Problems
/// such as a malformed name or pattern are not reported here; they surface
/// together when the [`WizardDefinition`](crate::schema::WizardDefinition)
/// is built.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    label: Option<String>,
    placeholder: Option<String>,
    kind: FieldKind,
    constraints: Vec<Constraint>,
    options: Vec<ChoiceOption>,
    default: String,
    pub(crate) bad_pattern: Option<(String, String)>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            placeholder: None,
            kind,
            constraints: Vec::new(),
            options: Vec::new(),
            default: String::new(),
            bad_pattern: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Numeric)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// A pattern field; the expression becomes its first constraint
    pub fn pattern(name: impl Into<String>, expr: &str, message: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Pattern).matches(expr, message)
    }

    pub fn choice<I>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = ChoiceOption>,
    {
        let mut spec = Self::new(name, FieldKind::EnumChoice);
        spec.options = options.into_iter().collect();
        spec
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    /// Append a constraint; constraints run in the order they are added
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.constraint(Constraint::required(message))
    }

    pub fn min_length(self, limit: usize, message: impl Into<String>) -> Self {
        self.constraint(Constraint::min_length(limit, message))
    }

    pub fn max_length(self, limit: usize, message: impl Into<String>) -> Self {
        self.constraint(Constraint::max_length(limit, message))
    }

    /// Require the raw text to match `expr`
    ///
    /// An invalid expression is remembered and reported when the definition
    /// is built.
    pub fn matches(mut self, expr: &str, message: impl Into<String>) -> Self {
        match Regex::new(expr) {
            Ok(regex) => self.constraint(Constraint::pattern(regex, message)),
            Err(e) => {
                if self.bad_pattern.is_none() {
                    self.bad_pattern = Some((expr.to_string(), e.to_string()));
                }
                self
            }
        }
    }

    pub fn min(self, limit: Decimal, message: impl Into<String>) -> Self {
        self.constraint(Constraint::min(limit, message))
    }

    pub fn max(self, limit: Decimal, message: impl Into<String>) -> Self {
        self.constraint(Constraint::max(limit, message))
    }

    pub fn not_before(self, date: NaiveDate, message: impl Into<String>) -> Self {
        self.constraint(Constraint::not_before(date, message))
    }

    pub fn not_before_field(self, other: FieldName, message: impl Into<String>) -> Self {
        self.constraint(Constraint::not_before_field(other, message))
    }

    pub fn check<F>(self, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str, &FormValues) -> bool + Send + Sync + 'static,
    {
        self.constraint(Constraint::custom(check, message))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label, falling back to the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn default_raw(&self) -> &str {
        &self.default
    }

    /// Whether the field carries a `Required` rule
    pub fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.rule(), Rule::Required))
    }

    /// Summary of the rules, e.g. `required, min length 3`
    pub fn rules_summary(&self) -> String {
        self.constraints
            .iter()
            .map(|c| c.rule().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
