//! Field identity and the raw value store
//!
//! Every value and every error in a wizard is keyed by a [`FieldName`], an
//! identifier checked once when the form definition is built. Hosts hand raw
//! text to the store; typing happens during validation.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A validated field identifier (e.g. `clientName`, `issue_date`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

/// Error returned when a string is not a usable field identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldNameError {
    #[error("field name cannot be empty")]
    Empty,

    #[error("field name '{0}' must start with an ASCII letter")]
    InvalidStart(String),

    #[error("field name '{name}' contains invalid character '{ch}'")]
    InvalidChar { name: String, ch: char },
}

impl FieldName {
    /// Parse and validate a field identifier
    ///
    /// Names start with an ASCII letter and continue with ASCII letters,
    /// digits, `_` or `-`.
    pub fn new(name: impl Into<String>) -> Result<Self, FieldNameError> {
        let name = name.into();
        let mut chars = name.chars();
        match chars.next() {
            None => return Err(FieldNameError::Empty),
            Some(c) if !c.is_ascii_alphabetic() => {
                return Err(FieldNameError::InvalidStart(name));
            }
            Some(_) => {}
        }
        if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
            return Err(FieldNameError::InvalidChar { name, ch });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldName {
    type Err = FieldNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FieldName {
    type Error = FieldNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> Self {
        name.0
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised while turning an external value document into [`FormValues`]
#[derive(Debug, Error)]
pub enum ValuesError {
    #[error("value document must be a mapping of field names to values")]
    NotAMapping,

    #[error("invalid field name in value document: {0}")]
    InvalidName(#[from] FieldNameError),

    #[error("value for '{field}' must be a string, number, boolean or null")]
    NotAScalar { field: String },
}

/// Current raw input, one string per field
///
/// Missing entries read as the empty string. The store never interprets its
/// contents; numbers and dates stay textual until validation coerces them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<FieldName, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for a field, if one has been stored
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Raw value for a field, with absent fields reading as empty
    pub fn raw(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn set(&mut self, name: FieldName, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a value set from `(name, value)` pairs, validating every name
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FieldNameError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Self::new();
        for (name, value) in pairs {
            values.set(FieldName::new(name)?, value);
        }
        Ok(values)
    }

    /// Build a value set from a parsed JSON/YAML mapping
    ///
    /// Scalars are rendered to their textual form so that `amount: 1500.5`
    /// and `amount: "1500.5"` load identically. `null` becomes the empty
    /// string.
    pub fn from_document(doc: &JsonValue) -> Result<Self, ValuesError> {
        let map = doc.as_object().ok_or(ValuesError::NotAMapping)?;
        let mut values = Self::new();
        for (key, value) in map {
            let raw = match value {
                JsonValue::Null => String::new(),
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(ValuesError::NotAScalar { field: key.clone() });
                }
            };
            values.set(FieldName::new(key.as_str())?, raw);
        }
        Ok(values)
    }
}
