//! Field constraints - a rule paired with the message shown when it fails

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

use crate::core::values::{FieldName, FormValues};

/// Host-supplied check over a field's raw text and the full value set
pub type Predicate = Arc<dyn Fn(&str, &FormValues) -> bool + Send + Sync>;

/// The check performed by a [`Constraint`]
#[derive(Clone)]
pub enum Rule {
    /// Value must not be blank
    Required,
    /// Raw text must have at least this many characters
    MinLength(usize),
    /// Raw text must have at most this many characters
    MaxLength(usize),
    /// Raw text must match the expression
    Pattern(Regex),
    /// Raw text must be one of the listed values
    OneOf(Vec<String>),
    /// Numeric value must be >= the limit
    Min(Decimal),
    /// Numeric value must be <= the limit
    Max(Decimal),
    /// Date must not be earlier than the given day
    NotBefore(NaiveDate),
    /// Date must not be earlier than another date field's value
    NotBeforeField(FieldName),
    /// Arbitrary host check
    Custom(Predicate),
}

impl Rule {
    /// Short name used in listings and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::Pattern(_) => "pattern",
            Rule::OneOf(_) => "one_of",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::NotBefore(_) => "not_before",
            Rule::NotBeforeField(_) => "not_before_field",
            Rule::Custom(_) => "custom",
        }
    }

    /// Rules that only make sense on a numeric field
    pub fn is_numeric(&self) -> bool {
        matches!(self, Rule::Min(_) | Rule::Max(_))
    }

    /// Rules that only make sense on a date field
    pub fn is_temporal(&self) -> bool {
        matches!(self, Rule::NotBefore(_) | Rule::NotBeforeField(_))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::MinLength(n) => write!(f, "MinLength({})", n),
            Rule::MaxLength(n) => write!(f, "MaxLength({})", n),
            Rule::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
            Rule::OneOf(options) => write!(f, "OneOf({:?})", options),
            Rule::Min(limit) => write!(f, "Min({})", limit),
            Rule::Max(limit) => write!(f, "Max({})", limit),
            Rule::NotBefore(date) => write!(f, "NotBefore({})", date),
            Rule::NotBeforeField(other) => write!(f, "NotBeforeField({})", other),
            Rule::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::MinLength(n) => write!(f, "min length {}", n),
            Rule::MaxLength(n) => write!(f, "max length {}", n),
            Rule::Pattern(re) => write!(f, "matches {}", re.as_str()),
            Rule::OneOf(options) => write!(f, "one of {}", options.join("|")),
            Rule::Min(limit) => write!(f, ">= {}", limit),
            Rule::Max(limit) => write!(f, "<= {}", limit),
            Rule::NotBefore(date) => write!(f, "not before {}", date),
            Rule::NotBeforeField(other) => write!(f, "not before {}", other),
            Rule::Custom(_) => write!(f, "custom check"),
        }
    }
}

/// A rule and its failure message
#[derive(Debug, Clone)]
pub struct Constraint {
    rule: Rule,
    message: String,
}

impl Constraint {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Rule::Required, message)
    }

    pub fn min_length(limit: usize, message: impl Into<String>) -> Self {
        Self::new(Rule::MinLength(limit), message)
    }

    pub fn max_length(limit: usize, message: impl Into<String>) -> Self {
        Self::new(Rule::MaxLength(limit), message)
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::new(Rule::Pattern(regex), message)
    }

    pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Rule::OneOf(options.into_iter().map(Into::into).collect()),
            message,
        )
    }

    pub fn min(limit: Decimal, message: impl Into<String>) -> Self {
        Self::new(Rule::Min(limit), message)
    }

    pub fn max(limit: Decimal, message: impl Into<String>) -> Self {
        Self::new(Rule::Max(limit), message)
    }

    pub fn not_before(date: NaiveDate, message: impl Into<String>) -> Self {
        Self::new(Rule::NotBefore(date), message)
    }

    pub fn not_before_field(other: FieldName, message: impl Into<String>) -> Self {
        Self::new(Rule::NotBeforeField(other), message)
    }

    /// Wrap a closure as a constraint
    pub fn custom<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str, &FormValues) -> bool + Send + Sync + 'static,
    {
        Self::new(Rule::Custom(Arc::new(check)), message)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
